pub mod position;
pub mod restaurant;
pub mod user;

pub use position::{Position, PositionInput};
pub use restaurant::{NewRestaurant, Restaurant, RestaurantChanges, RestaurantSearch};
pub use user::{NewUser, User};
