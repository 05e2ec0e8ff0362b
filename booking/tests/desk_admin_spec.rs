use std::sync::Arc;

use booking::clock::{Clock, FixedClock};
use booking::models::{Actor, ActorProfile, DeskDraft, DeskPatch};
use booking::store::Store;
use booking::{DeskService, ErrorKind, ReservationService};
use chrono::{DateTime, Duration, TimeZone, Utc};
use grants::{Evaluator, GrantCfg, GrantsConfig};

fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 4, 18, 9, 30, 0).unwrap()
}

fn evaluator() -> Arc<Evaluator> {
    Arc::new(Evaluator::new(
        GrantsConfig::default()
            .with_role(
                "facilities",
                vec![
                    GrantCfg::new("admin/", "desk"),
                    GrantCfg::new("admin/", "desk_reservation"),
                ],
            )
            .with_role("student", vec![]),
    ))
}

fn services() -> (DeskService, ReservationService, Store) {
    let store = Store::open_in_memory().unwrap();
    let grants = evaluator();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(base_now()));
    (
        DeskService::new(store.clone(), Arc::clone(&grants), Arc::clone(&clock)),
        ReservationService::new(store.clone(), grants, clock),
        store,
    )
}

fn draft(tag: &str) -> DeskDraft {
    DeskDraft {
        tag: tag.to_string(),
        desk_type: "Computer Desk".to_string(),
        included_resource: "Pro Display XDR w/ Mac Pro".to_string(),
        available: true,
    }
}

fn admin() -> Actor {
    Actor::new(1, vec!["facilities".to_string()])
}

fn student(id: i64) -> Actor {
    Actor::new(id, vec!["student".to_string()])
}

fn register(store: &Store, id: i64, handle: &str) {
    store
        .upsert_actor(&ActorProfile {
            id,
            handle: handle.to_string(),
            display_name: handle.to_uppercase(),
        })
        .unwrap();
}

#[test]
fn given_admin_when_creating_desks_then_list_all_orders_by_id() {
    // Arrange
    let (desks, _, _) = services();

    // Act
    let cd1 = desks.create(&admin(), draft("CD1")).unwrap();
    let aa1 = desks.create(&admin(), draft("AA1")).unwrap();

    // Assert - insertion order, not tag order
    let all = desks.list_all(&admin()).unwrap();
    assert_eq!(
        all.iter().map(|d| d.id).collect::<Vec<_>>(),
        vec![cd1.id, aa1.id]
    );
    assert!(all.iter().all(|d| d.available));
}

#[test]
fn given_student_when_creating_desk_then_permission_denied() {
    let (desks, _, _) = services();

    let err = desks.create(&student(5), draft("CD1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[test]
fn given_existing_tag_when_creating_then_conflict() {
    let (desks, _, _) = services();
    desks.create(&admin(), draft("CD1")).unwrap();

    let err = desks.create(&admin(), draft("CD1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn given_malformed_tag_when_creating_then_validation_error() {
    let (desks, _, _) = services();

    let err = desks.create(&admin(), draft("bad tag!")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn given_student_when_listing_all_then_denied_but_available_is_public() {
    // Arrange
    let (desks, _, _) = services();
    desks.create(&admin(), draft("CD1")).unwrap();
    let sd1 = desks.create(&admin(), draft("SD1")).unwrap();
    desks.toggle_availability(&admin(), sd1.id).unwrap();

    // Act / Assert - list_all requires the desk-admin grant
    let err = desks.list_all(&student(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    // Assert - the public listing filters to available desks
    let available = desks.list_available().unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].tag, "CD1");
}

#[test]
fn given_missing_desk_when_getting_then_not_found() {
    let (desks, _, _) = services();

    let err = desks.get(404).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "desk 404 not found");
}

#[test]
fn given_admin_when_updating_then_fields_change_and_tag_is_immutable() {
    // Arrange
    let (desks, _, _) = services();
    let desk = desks.create(&admin(), draft("CD1")).unwrap();

    // Act - patch two fields, leave the rest untouched
    let updated = desks
        .update(
            &admin(),
            desk.id,
            DeskPatch {
                desk_type: Some("Standing Desk".to_string()),
                included_resource: None,
                available: Some(false),
            },
        )
        .unwrap();

    // Assert
    assert_eq!(updated.tag, "CD1");
    assert_eq!(updated.desk_type, "Standing Desk");
    assert_eq!(updated.included_resource, desk.included_resource);
    assert!(!updated.available);
    assert_eq!(desks.get(desk.id).unwrap(), updated);
}

#[test]
fn given_student_when_updating_then_permission_denied() {
    let (desks, _, _) = services();
    let desk = desks.create(&admin(), draft("CD1")).unwrap();

    let err = desks
        .update(&student(5), desk.id, DeskPatch::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[test]
fn given_admin_when_removing_then_snapshot_returned_and_desk_gone() {
    // Arrange
    let (desks, _, _) = services();
    let desk = desks.create(&admin(), draft("CD1")).unwrap();

    // Act
    let removed = desks.remove(&admin(), desk.id).unwrap();

    // Assert
    assert_eq!(removed, desk);
    assert_eq!(
        desks.get(desk.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        desks.remove(&admin(), desk.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn given_future_and_past_reservations_when_desk_disabled_then_only_future_dropped() {
    // Arrange - one reservation in the past, one upcoming
    let (desks, reservations, store) = services();
    let desk = desks.create(&admin(), draft("CD1")).unwrap();
    register(&store, 7, "amber");
    let student7 = student(7);
    let past = reservations
        .create(&student7, desk.id, base_now() - Duration::days(30))
        .unwrap();
    let future = reservations
        .create(&student7, desk.id, base_now() + Duration::hours(2))
        .unwrap();

    // Act
    let toggled = desks.toggle_availability(&admin(), desk.id).unwrap();

    // Assert - flag flipped, future slot freed, history intact
    assert!(!toggled.available);
    assert!(store.get_reservation(future.id).unwrap().is_none());
    assert!(store.get_reservation(past.id).unwrap().is_some());
}

#[test]
fn given_toggle_twice_then_availability_round_trips() {
    // Arrange
    let (desks, reservations, store) = services();
    let desk = desks.create(&admin(), draft("CD1")).unwrap();
    register(&store, 7, "amber");
    let past = reservations
        .create(&student(7), desk.id, base_now() - Duration::days(2))
        .unwrap();

    // Act - disable then re-enable
    let off = desks.toggle_availability(&admin(), desk.id).unwrap();
    let on = desks.toggle_availability(&admin(), desk.id).unwrap();

    // Assert
    assert!(!off.available);
    assert!(on.available);
    assert_eq!(on.available, desk.available);
    assert!(store.get_reservation(past.id).unwrap().is_some());
}

#[test]
fn given_reservation_exactly_at_current_hour_when_desk_disabled_then_dropped() {
    // Arrange - now is 09:30, so the 09:00 slot counts as present
    let (desks, reservations, store) = services();
    let desk = desks.create(&admin(), draft("CD1")).unwrap();
    register(&store, 7, "amber");
    let current_slot = reservations
        .create(&student(7), desk.id, base_now())
        .unwrap();

    // Act
    desks.toggle_availability(&admin(), desk.id).unwrap();

    // Assert
    assert!(store.get_reservation(current_slot.id).unwrap().is_none());
}

#[test]
fn given_update_sets_unavailable_then_reservations_survive() {
    // Arrange - update, unlike toggle, never cascades
    let (desks, reservations, store) = services();
    let desk = desks.create(&admin(), draft("CD1")).unwrap();
    register(&store, 7, "amber");
    let future = reservations
        .create(&student(7), desk.id, base_now() + Duration::hours(2))
        .unwrap();

    // Act
    desks
        .update(
            &admin(),
            desk.id,
            DeskPatch {
                available: Some(false),
                ..DeskPatch::default()
            },
        )
        .unwrap();

    // Assert
    assert!(store.get_reservation(future.id).unwrap().is_some());
}

#[test]
fn given_student_when_toggling_then_permission_denied() {
    let (desks, _, _) = services();
    let desk = desks.create(&admin(), draft("CD1")).unwrap();

    let err = desks
        .toggle_availability(&student(5), desk.id)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}
