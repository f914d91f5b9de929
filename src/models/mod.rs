pub mod item;

pub use item::AddItemRequest;
