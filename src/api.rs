pub mod google;
pub mod shelly;
