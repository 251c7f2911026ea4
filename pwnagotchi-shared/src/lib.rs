pub mod config;
pub mod logger;

pub mod utils {
  pub mod general;
}
