//! Fixture identifiers from `fixtures/directory.sql`.

use uuid::Uuid;

pub const ADMINISTRATORS: Uuid = Uuid::from_u128(0x10000000_0000_0000_0000_000000000001);
pub const FINANCE: Uuid = Uuid::from_u128(0x10000000_0000_0000_0000_000000000002);
pub const AUDITORS: Uuid = Uuid::from_u128(0x10000000_0000_0000_0000_000000000003);
pub const VISITORS: Uuid = Uuid::from_u128(0x10000000_0000_0000_0000_000000000004);

pub const TEST_PASSWORD: &str = "StrongPassword123!";
