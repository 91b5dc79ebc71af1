use super::common::*;
use crate::workflows::applications::aggregate::{
    aggregate, counts, pending_by_track, validated_entries,
};
use crate::workflows::applications::domain::{AdminId, TrackType};

#[test]
fn pending_queue_only_lists_clients_pending_on_that_track() {
    let mut first = client("one");
    first.partner = pending_track(t0());
    let mut second = client("two");
    second.residence = pending_track(t0());
    let third = client("three");
    let clients = vec![first, second, third];

    let partner = pending_by_track(&clients, TrackType::Partner);
    assert_eq!(partner.len(), 1);
    assert_eq!(partner[0].id.0, "client-one");

    let residence = pending_by_track(&clients, TrackType::Residence);
    assert_eq!(residence.len(), 1);
    assert_eq!(residence[0].id.0, "client-two");

    assert!(pending_by_track(&clients, TrackType::Equivalence).is_empty());
}

#[test]
fn validated_entries_are_newest_first() {
    let mut first = client("one");
    first.equivalence = validated_track(at(1, 0));
    let mut second = client("two");
    second.partner = validated_track(at(3, 0));
    let mut third = client("three");
    third.residence = validated_track(at(2, 0));

    let entries = validated_entries(&[first, second, third]);
    let order: Vec<_> = entries
        .iter()
        .map(|entry| (entry.client_id.0.as_str(), entry.track))
        .collect();
    assert_eq!(
        order,
        vec![
            ("client-two", TrackType::Partner),
            ("client-three", TrackType::Residence),
            ("client-one", TrackType::Equivalence),
        ]
    );
}

#[test]
fn a_client_validated_twice_yields_two_entries() {
    let mut multi = client("multi");
    multi.equivalence = validated_track(at(1, 0));
    multi.partner = validated_track(at(5, 0));
    multi.residence = pending_track(at(2, 0));

    let entries = validated_entries(&[multi]);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].track, TrackType::Partner);
    assert_eq!(entries[0].validated_at, at(5, 0));
    assert_eq!(entries[1].track, TrackType::Equivalence);
    assert!(entries.iter().all(|entry| entry.client_name == "Client multi"));
}

#[test]
fn tracks_without_their_own_stamp_use_the_client_stamp() {
    let mut legacy = client("legacy");
    legacy.residence = validated_track(at(4, 0));
    legacy.residence.validated_at = None;
    legacy.residence.validated_by = None;
    legacy.validated_at = Some(at(6, 0));
    legacy.validated_by = Some(AdminId("admin-legacy".to_string()));

    let entries = validated_entries(&[legacy]);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].validated_at, at(6, 0));
    assert_eq!(
        entries[0].validated_by,
        Some(AdminId("admin-legacy".to_string()))
    );
}

#[test]
fn unstamped_validated_tracks_are_still_listed() {
    let mut submitted = client("submitted");
    submitted.partner = validated_track(at(4, 0));
    submitted.partner.validated_at = None;
    submitted.partner.submitted_at = Some(at(2, 0));

    let mut bare = client("bare");
    bare.equivalence = validated_track(at(4, 0));
    bare.equivalence.validated_at = None;
    bare.equivalence.submitted_at = None;

    let entries = validated_entries(&[submitted, bare]);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].client_id.0, "client-submitted");
    assert_eq!(entries[0].validated_at, at(2, 0));
    assert_eq!(entries[1].client_id.0, "client-bare");
    assert_eq!(entries[1].validated_at, t0());
}

#[test]
fn counts_tally_each_track_in_one_pass() {
    let mut first = client("one");
    first.partner = pending_track(t0());
    first.equivalence = validated_track(at(1, 0));
    let mut second = client("two");
    second.partner = pending_track(t0());
    second.residence = rejected_track(at(2, 0), "Blurry scan");
    let mut third = client("three");
    third.residence = rejected_track(t0(), "");

    let tiles = counts(&[first, second, third], at(20, 0));
    assert_eq!(tiles.total_clients, 3);
    assert_eq!(tiles.partner.pending, 2);
    assert_eq!(tiles.residence.pending, 0);
    assert_eq!(tiles.track(TrackType::Equivalence).validated, 1);
    assert_eq!(tiles.residence.rejected_in_cooldown, 2);

    let mut later = client("four");
    later.residence = rejected_track(t0(), "");
    let tiles = counts(&[later], at(24, 0));
    assert_eq!(tiles.residence.rejected_in_cooldown, 0);
}

#[test]
fn aggregate_bundles_queues_entries_and_counts() {
    let mut first = client("one");
    first.partner = pending_track(t0());
    let mut second = client("two");
    second.residence = pending_track(t0());
    second.equivalence = validated_track(at(1, 0));
    let third = client("three");

    let aggregates = aggregate(&[first, second, third], at(2, 0));
    assert_eq!(aggregates.pending_by_track.len(), 3);
    let partner = aggregates.pending(TrackType::Partner);
    assert_eq!(partner.len(), 1);
    assert_eq!(partner[0].email, "one@example.com");
    assert!(aggregates.pending(TrackType::Equivalence).is_empty());
    assert_eq!(aggregates.validated_entries.len(), 1);
    assert_eq!(aggregates.counts.total_clients, 3);
    assert_eq!(aggregates.counts.residence.pending, 1);
}
