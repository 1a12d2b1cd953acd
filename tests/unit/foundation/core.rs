use super::*;
use proptest::prelude::*;

#[test]
fn union_of_two_boxes_is_their_hull() {
    let r: Region = [
        Region::Bounded(Rect::new(0.0, 0.0, 10.0, 10.0)),
        Region::Bounded(Rect::new(5.0, 5.0, 20.0, 20.0)),
    ]
    .into_iter()
    .collect();
    assert_eq!(r, Region::Bounded(Rect::new(0.0, 0.0, 20.0, 20.0)));
}

#[test]
fn union_with_unbounded_contributor_is_unbounded() {
    let r: Region = [
        Region::Bounded(Rect::new(0.0, 0.0, 10.0, 10.0)),
        Region::Unbounded,
        Region::Bounded(Rect::new(5.0, 5.0, 20.0, 20.0)),
    ]
    .into_iter()
    .collect();
    assert_eq!(r, Region::Unbounded);
    assert_eq!(r.to_host(), Some(HostRect::UNBOUNDED));
}

#[test]
fn union_of_nothing_is_degenerate() {
    let r: Region = std::iter::empty::<Region>().collect();
    assert!(r.is_empty());
    assert_eq!(Region::from_rect(r.to_rect()), Region::Empty);
    assert_eq!(r.to_host(), None);
}

#[test]
fn classification_checks_degenerate_before_finite() {
    assert_eq!(Region::from_rect(empty_union_rect()), Region::Empty);
    assert_eq!(Region::from_rect(infinite_rect()), Region::Unbounded);
    assert_eq!(
        Region::from_rect(Rect::new(0.0, 0.0, 0.0, 5.0)),
        Region::Empty
    );
    assert_eq!(
        Region::from_rect(Rect::new(0.0, 0.0, f64::INFINITY, 5.0)),
        Region::Unbounded
    );
}

#[test]
fn host_sentinel_round_trips_through_region() {
    assert_eq!(Region::from_host(HostRect::UNBOUNDED), Region::Unbounded);
    let half = HostRect::new(-f64::MAX, 0.0, 10.0, 10.0);
    assert!(half.is_unbounded_sentinel());
    assert_eq!(Region::from_host(half), Region::Unbounded);

    let finite = HostRect::new(1.0, 2.0, 3.0, 4.0);
    assert_eq!(
        Region::from_host(finite),
        Region::Bounded(Rect::new(1.0, 2.0, 3.0, 4.0))
    );
    assert_eq!(Region::from_host(finite).to_host(), Some(finite));
}

#[test]
fn fallback_only_replaces_unbounded() {
    let tile = Rect::new(0.0, 0.0, 64.0, 64.0);
    assert_eq!(Region::Unbounded.or_fallback(tile), Some(tile));
    assert_eq!(Region::Empty.or_fallback(tile), None);
    let b = Rect::new(1.0, 1.0, 2.0, 2.0);
    assert_eq!(Region::Bounded(b).or_fallback(tile), Some(b));
}

proptest! {
    #[test]
    fn union_is_commutative_and_contains_both(
        a in (-100.0f64..100.0, -100.0f64..100.0, 1.0f64..50.0, 1.0f64..50.0),
        b in (-100.0f64..100.0, -100.0f64..100.0, 1.0f64..50.0, 1.0f64..50.0),
    ) {
        let ra = Region::Bounded(Rect::new(a.0, a.1, a.0 + a.2, a.1 + a.3));
        let rb = Region::Bounded(Rect::new(b.0, b.1, b.0 + b.2, b.1 + b.3));
        prop_assert_eq!(ra.union(rb), rb.union(ra));

        let Region::Bounded(u) = ra.union(rb) else {
            panic!("union of two bounded regions must be bounded");
        };
        prop_assert!(u.x0 <= a.0 && u.x0 <= b.0);
        prop_assert!(u.y1 >= a.1 + a.3 && u.y1 >= b.1 + b.3);
        prop_assert_eq!(ra.union(Region::Empty), ra);
        prop_assert_eq!(ra.union(Region::Unbounded), Region::Unbounded);
    }
}
