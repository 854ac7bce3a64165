use caretaker_core::db::open_db_in_memory;
use caretaker_core::model::ticket::TicketStatus;
use caretaker_core::{
    reconcile, BuildingPlan, BuildingsConfig, EstateRepository, OpenTicketRequest, Role,
    ServiceError, SqliteEstateRepository, SqliteTicketRepository, TicketService, User,
};
use rusqlite::Connection;
use uuid::Uuid;

fn admin() -> User {
    User {
        uuid: Uuid::new_v4(),
        username: "admin".to_string(),
        password_hash: "h".to_string(),
        password_salt: "s".to_string(),
        role: Role::Admin,
        building_uuid: None,
        room_uuid: None,
    }
}

fn seed_oak(conn: &mut Connection) -> Uuid {
    let config = BuildingsConfig {
        buildings: vec![BuildingPlan {
            name: "Oak".to_string(),
            room_count: 1,
        }],
    };
    reconcile(conn, &config).unwrap();
    let overviews = SqliteEstateRepository::new(conn).list_overviews().unwrap();
    overviews[0].rooms[0].room.uuid
}

fn request(room_uuid: Uuid) -> OpenTicketRequest {
    OpenTicketRequest {
        room_uuid,
        customer_name: "Ada".to_string(),
        phone_number: "555-0101".to_string(),
        problem_type: "plumbing".to_string(),
        note: "leaking tap".to_string(),
    }
}

#[test]
fn open_ticket_starts_open_and_persists() {
    let mut conn = open_db_in_memory().unwrap();
    let room = seed_oak(&mut conn);
    let service = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );

    let ticket = service.open_ticket(&admin(), &request(room)).unwrap();
    assert_eq!(ticket.status, TicketStatus::Open);
    assert!(ticket.created_at > 0);
    assert!(ticket.closed_at.is_none());

    let overviews = SqliteEstateRepository::new(&conn).list_overviews().unwrap();
    assert_eq!(overviews[0].rooms[0].tickets.len(), 1);
    assert_eq!(overviews[0].rooms[0].tickets[0].uuid, ticket.uuid);
}

#[test]
fn open_ticket_for_missing_room_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    seed_oak(&mut conn);
    let service = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );

    let missing = Uuid::new_v4();
    let err = service.open_ticket(&admin(), &request(missing)).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound { entity: "room", id } if id == missing
    ));
}

#[test]
fn open_ticket_requires_non_empty_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let room = seed_oak(&mut conn);
    let service = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );

    let mut bad = request(room);
    bad.phone_number = "  ".to_string();
    let err = service.open_ticket(&admin(), &bad).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn close_ticket_stamps_closed_at() {
    let mut conn = open_db_in_memory().unwrap();
    let room = seed_oak(&mut conn);
    let service = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );

    let ticket = service.open_ticket(&admin(), &request(room)).unwrap();
    let closed = service.close_ticket(&admin(), ticket.uuid).unwrap();
    assert_eq!(closed.status, TicketStatus::Closed);
    let closed_at = closed.closed_at.expect("closed_at must be set");
    assert!(closed_at >= ticket.created_at);
}

#[test]
fn close_missing_ticket_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    seed_oak(&mut conn);
    let service = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );

    let missing = Uuid::new_v4();
    let err = service.close_ticket(&admin(), missing).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound { entity: "ticket", id } if id == missing
    ));
}

#[test]
fn closing_twice_re_stamps_but_never_reopens() {
    let mut conn = open_db_in_memory().unwrap();
    let room = seed_oak(&mut conn);
    let service = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );

    let ticket = service.open_ticket(&admin(), &request(room)).unwrap();
    let first = service.close_ticket(&admin(), ticket.uuid).unwrap();
    let second = service.close_ticket(&admin(), ticket.uuid).unwrap();

    assert_eq!(second.status, TicketStatus::Closed);
    assert!(second.closed_at.unwrap() >= first.closed_at.unwrap());
}
