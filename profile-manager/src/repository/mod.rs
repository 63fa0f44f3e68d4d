pub mod profile_repo;
pub mod reservation_repo;

pub use profile_repo::ProfileRepository;
pub use reservation_repo::ReservationRepository;

// Collection names are part of the stored data contract. Do not rename.
pub const USER_NAMES: &str = "userNames";
pub const USER_PROFILES: &str = "userProfiles";
