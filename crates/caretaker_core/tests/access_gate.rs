//! End-to-end scoping and permission checks through the service layer.

use caretaker_core::db::open_db_in_memory;
use caretaker_core::{
    reconcile, BuildingPlan, BuildingsConfig, CreateCustomerRequest, EstateRepository,
    EstateService, OpenTicketRequest, Role, ServiceError, SqliteEstateRepository,
    SqliteTicketRepository, SqliteUserRepository, TicketService, User, UserRepository, UserService,
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

fn seed(conn: &mut Connection, entries: &[(&str, u32)]) {
    let config = BuildingsConfig {
        buildings: entries
            .iter()
            .map(|(name, room_count)| BuildingPlan {
                name: (*name).to_string(),
                room_count: *room_count,
            })
            .collect(),
    };
    reconcile(conn, &config).unwrap();
}

fn room(conn: &Connection, building_name: &str, position: usize) -> (Uuid, Uuid) {
    let overviews = SqliteEstateRepository::new(conn).list_overviews().unwrap();
    let building = overviews
        .iter()
        .find(|overview| overview.building.name == building_name)
        .expect("building should exist");
    (building.building.uuid, building.rooms[position].room.uuid)
}

fn create_customer(conn: &Connection, username: &str, building: Uuid, room: Uuid) -> User {
    let users = UserService::new(
        SqliteUserRepository::new(conn),
        SqliteEstateRepository::new(conn),
    );
    let summary = users
        .create_customer(
            &admin(),
            &CreateCustomerRequest {
                username: username.to_string(),
                password: "pw".to_string(),
                building_uuid: building,
                room_uuid: room,
            },
        )
        .unwrap();
    SqliteUserRepository::new(conn)
        .get_user(summary.id)
        .unwrap()
        .expect("customer should be persisted")
}

fn ticket_request(room_uuid: Uuid) -> OpenTicketRequest {
    OpenTicketRequest {
        room_uuid,
        customer_name: "Ada".to_string(),
        phone_number: "555-0101".to_string(),
        problem_type: "plumbing".to_string(),
        note: "leaking tap".to_string(),
    }
}

#[test]
fn customer_sees_only_their_building() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, &[("Oak", 2), ("Elm", 2)]);
    let (oak, oak_flat1) = room(&conn, "Oak", 0);
    let customer = create_customer(&conn, "ada", oak, oak_flat1);

    let estate = EstateService::new(SqliteEstateRepository::new(&conn));
    let view = estate.list_buildings_for(&customer).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].building.name, "Oak");
    // All rooms of the assigned building are visible.
    assert_eq!(view[0].rooms.len(), 2);

    let admin_view = estate.list_buildings_for(&admin()).unwrap();
    assert_eq!(admin_view.len(), 2);
}

#[test]
fn unscoped_listing_returns_every_building_with_nested_tickets() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, &[("Oak", 2), ("Elm", 1)]);
    let (_, oak_flat2) = room(&conn, "Oak", 1);

    let tickets = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );
    let ticket = tickets
        .open_ticket(&admin(), &ticket_request(oak_flat2))
        .unwrap();

    let estate = EstateService::new(SqliteEstateRepository::new(&conn));
    let overviews = estate.list_buildings().unwrap();
    assert_eq!(overviews.len(), 2);

    let oak_view = overviews
        .iter()
        .find(|overview| overview.building.name == "Oak")
        .expect("Oak should be listed");
    assert_eq!(oak_view.rooms.len(), 2);
    assert!(oak_view.rooms[0].tickets.is_empty());
    assert_eq!(oak_view.rooms[1].tickets.len(), 1);
    assert_eq!(oak_view.rooms[1].tickets[0].uuid, ticket.uuid);
}

#[test]
fn customer_cannot_close_ticket_in_another_room() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, &[("Oak", 2)]);
    let (oak, flat1) = room(&conn, "Oak", 0);
    let (_, flat2) = room(&conn, "Oak", 1);
    let customer = create_customer(&conn, "ada", oak, flat1);

    let tickets = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );
    let other_ticket = tickets.open_ticket(&admin(), &ticket_request(flat2)).unwrap();

    let err = tickets.close_ticket(&customer, other_ticket.uuid).unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized));

    // The admin can still close it.
    tickets.close_ticket(&admin(), other_ticket.uuid).unwrap();
}

#[test]
fn customer_manages_tickets_for_their_own_room() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, &[("Oak", 2)]);
    let (oak, flat1) = room(&conn, "Oak", 0);
    let (_, flat2) = room(&conn, "Oak", 1);
    let customer = create_customer(&conn, "ada", oak, flat1);

    let tickets = TicketService::new(
        SqliteEstateRepository::new(&conn),
        SqliteTicketRepository::new(&conn),
    );

    let own = tickets.open_ticket(&customer, &ticket_request(flat1)).unwrap();
    tickets.close_ticket(&customer, own.uuid).unwrap();

    let err = tickets
        .open_ticket(&customer, &ticket_request(flat2))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized));
}

#[test]
fn customer_cannot_manage_users() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, &[("Oak", 1)]);
    let (oak, flat1) = room(&conn, "Oak", 0);
    let customer = create_customer(&conn, "ada", oak, flat1);

    let users = UserService::new(
        SqliteUserRepository::new(&conn),
        SqliteEstateRepository::new(&conn),
    );

    let err = users
        .create_customer(
            &customer,
            &CreateCustomerRequest {
                username: "eve".to_string(),
                password: "pw".to_string(),
                building_uuid: oak,
                room_uuid: flat1,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized));

    assert!(matches!(
        users.list_customers(&customer).unwrap_err(),
        ServiceError::Unauthorized
    ));
    assert!(matches!(
        users.delete_user(&customer, Uuid::new_v4()).unwrap_err(),
        ServiceError::Unauthorized
    ));
}

#[test]
fn customer_unassigned_by_reconciliation_sees_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, &[("Oak", 1), ("Elm", 1)]);
    let (elm, elm_flat1) = room(&conn, "Elm", 0);
    let customer = create_customer(&conn, "ada", elm, elm_flat1);

    // Elm disappears from the configuration; the assignment is cleared.
    seed(&mut conn, &[("Oak", 1)]);

    let refreshed = SqliteUserRepository::new(&conn)
        .get_user(customer.uuid)
        .unwrap()
        .expect("customer record survives");
    assert!(refreshed.building_uuid.is_none());
    assert!(refreshed.room_uuid.is_none());

    let estate = EstateService::new(SqliteEstateRepository::new(&conn));
    assert!(estate.list_buildings_for(&refreshed).unwrap().is_empty());
}
