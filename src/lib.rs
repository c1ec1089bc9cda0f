// DungeonDelvers Ops
//
// Library behind the dungeon-ops CLIs: canonical contract address handling,
// config synchronization into consumer projects, on-chain wiring and
// verification, and the commit-reveal watcher.

pub mod addresses;
pub mod chain;
pub mod config;
pub mod reveal;
pub mod sync;
pub mod verify;
pub mod wiring;
