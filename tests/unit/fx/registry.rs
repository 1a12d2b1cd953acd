use super::*;
use crate::buffer::pixel::PixelBuffer;
use crate::fx::context::RenderContext;
use crate::fx::contract::{EffectMeta, Params, Ports};

struct Counter(u32);

impl Effect for Counter {
    fn meta(&self) -> EffectMeta {
        EffectMeta {
            ports: &[],
            param_groups: &[],
            params: &[],
        }
    }

    fn init(&mut self) -> RasterFxResult<()> {
        self.0 += 1;
        Ok(())
    }

    fn compute(
        &mut self,
        _ctx: &RenderContext,
        _params: &Params,
        _ports: &Ports,
        _out: &mut PixelBuffer,
    ) -> RasterFxResult<()> {
        Ok(())
    }
}

#[test]
fn ids_are_unique_and_lookups_work() {
    let reg = InstanceRegistry::new();
    let a = reg.insert(NodeId(1), Box::new(Counter(0))).unwrap();
    let b = reg.insert(NodeId(2), Box::new(Counter(0))).unwrap();
    assert_ne!(a, b);
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.get(a).map(|s| s.owner()), Some(NodeId(1)));
    assert!(reg.get(InstanceId(999)).is_none());
}

#[test]
fn only_the_owner_removes() {
    let reg = InstanceRegistry::new();
    let id = reg.insert(NodeId(1), Box::new(Counter(0))).unwrap();
    assert_eq!(reg.remove_if_owner(id, NodeId(2)).unwrap(), Removal::NotOwner(NodeId(1)));
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.remove_if_owner(id, NodeId(1)).unwrap(), Removal::Removed);
    assert_eq!(reg.remove_if_owner(id, NodeId(1)).unwrap(), Removal::Missing);
    assert!(reg.is_empty());
}

#[test]
fn slot_lock_gives_mutable_access() {
    let reg = InstanceRegistry::new();
    let id = reg.insert(NodeId(1), Box::new(Counter(0))).unwrap();
    let slot = reg.get(id).unwrap();
    slot.lock().unwrap().init().unwrap();
    slot.lock().unwrap().init().unwrap();
    assert_eq!(slot.lock().unwrap().meta().port_count(), 0);
}

#[test]
fn registry_is_shareable_across_threads() {
    let reg = InstanceRegistry::new();
    std::thread::scope(|s| {
        for n in 0..8 {
            let reg = &reg;
            s.spawn(move || {
                reg.insert(NodeId(n), Box::new(Counter(0))).unwrap();
            });
        }
    });
    assert_eq!(reg.len(), 8);
}
