// Entity-specific statements, as inherent impls on `Repository<Entity>`
mod positions;
mod restaurants;
mod users;
