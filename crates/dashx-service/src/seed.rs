//! Demo accounts, brokers and devices for local development.

use tracing::info;
use uuid::Uuid;

use dashx_core::error::messages;
use dashx_core::result::AppResult;
use dashx_entity::broker::{BrokerCredentials, CreateBroker};
use dashx_entity::device::CreateDevice;

use crate::{BrokerService, DeviceService, NewUser, UserService};

const DEMO_SERVER: &str = "ef57f832f11b4e89960ef452f56e6aa3.s2.eu.hivemq.cloud";
const DEMO_LOGIN: &str = "test01";

struct DemoUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    is_admin: bool,
}

struct DemoBroker {
    owner: usize,
    name: &'static str,
    keep_alive: i32,
    color: &'static str,
}

struct DemoDevice {
    broker: usize,
    name: &'static str,
    placing: &'static str,
    base_path: &'static str,
    color: &'static str,
}

const USERS: [DemoUser; 2] = [
    DemoUser {
        name: "psp515",
        email: "psp515@wp.pl",
        password: "Admin123!",
        is_admin: true,
    },
    DemoUser {
        name: "dred",
        email: "dred@gmail.pl",
        password: "User123!",
        is_admin: false,
    },
];

const BROKERS: [DemoBroker; 4] = [
    DemoBroker {
        owner: 0,
        name: "Test Devices",
        keep_alive: 60,
        color: "#ff00ff",
    },
    DemoBroker {
        owner: 0,
        name: "Home Devices",
        keep_alive: 10,
        color: "#aa00ff",
    },
    DemoBroker {
        owner: 1,
        name: "Test Devices",
        keep_alive: 20,
        color: "#cc00ff",
    },
    DemoBroker {
        owner: 1,
        name: "Test Devices",
        keep_alive: 60,
        color: "#dd00ff",
    },
];

const DEVICES: [DemoDevice; 6] = [
    DemoDevice {
        broker: 1,
        name: "Lamp",
        placing: "Office",
        base_path: "office-lamp",
        color: "#86b049",
    },
    DemoDevice {
        broker: 1,
        name: "Lamp",
        placing: "Bedroom",
        base_path: "bedroom-lamp",
        color: "#dff5ce",
    },
    DemoDevice {
        broker: 0,
        name: "Car",
        placing: "Office",
        base_path: "car",
        color: "#86b049",
    },
    DemoDevice {
        broker: 3,
        name: "Lamp",
        placing: "Office",
        base_path: "office-lamp",
        color: "#525b88",
    },
    DemoDevice {
        broker: 3,
        name: "Lamp",
        placing: "Bedroom",
        base_path: "bedroom-lamp",
        color: "#dff5ce",
    },
    DemoDevice {
        broker: 2,
        name: "Car",
        placing: "Office",
        base_path: "car",
        color: "#86b049",
    },
];

/// What a seed run created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub brokers: usize,
    pub devices: usize,
}

/// Insert the demo data set.
///
/// Returns an empty report when the demo admin already exists, so running
/// the seed twice leaves the store unchanged.
pub async fn seed_demo_data(
    users: &UserService,
    brokers: &BrokerService,
    devices: &DeviceService,
) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    let mut user_ids = Vec::with_capacity(USERS.len());
    for user in &USERS {
        let new_user = NewUser {
            name: user.name.into(),
            email: user.email.into(),
            password: user.password.into(),
        };
        match users.create_confirmed(new_user, user.is_admin).await {
            Ok(id) => user_ids.push(id),
            Err(e) if e.is(messages::EMAIL_EXISTS) && user_ids.is_empty() => {
                info!(email = user.email, "Demo data already present, skipping seed");
                return Ok(report);
            }
            Err(e) => return Err(e),
        }
    }
    report.users = user_ids.len();

    let mut broker_ids: Vec<(Uuid, Uuid)> = Vec::with_capacity(BROKERS.len());
    for broker in &BROKERS {
        let user_id = user_ids[broker.owner];
        let id = brokers
            .create(CreateBroker {
                user_id,
                name: broker.name.into(),
                server: DEMO_SERVER.into(),
                port: 8883,
                keep_alive: broker.keep_alive,
                icon_name: "default.png".into(),
                icon_background_color: broker.color.into(),
                is_ssl: true,
                client_id: Some("123".into()),
            })
            .await?;
        brokers
            .set_credentials(
                user_id,
                BrokerCredentials {
                    id,
                    username: Some(DEMO_LOGIN.into()),
                    password: Some(DEMO_LOGIN.into()),
                },
            )
            .await?;
        broker_ids.push((user_id, id));
    }
    report.brokers = broker_ids.len();

    for device in &DEVICES {
        let (user_id, broker_id) = broker_ids[device.broker];
        devices
            .create(CreateDevice {
                user_id,
                broker_id: Some(broker_id),
                name: device.name.into(),
                icon_name: "default2.png".into(),
                icon_background_color: device.color.into(),
                placing: Some(device.placing.into()),
                base_path: Some(device.base_path.into()),
            })
            .await?;
        report.devices += 1;
    }

    info!(
        users = report.users,
        brokers = report.brokers,
        devices = report.devices,
        "Demo data seeded"
    );
    Ok(report)
}
