//! Database Models
//!
//! Entity structs stored in SurrealDB plus their create/update payloads.
//! Record links between entities are `RecordId` fields named `*_id`; user
//! identities are opaque strings owned by the auth layer.

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod wishlist;

pub use cart::{Cart, CartItem, CartItemDetail, CartTotals};
pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use order::{NewOrderLine, Order, OrderDetail, OrderItem, OrderItemDetail, OrderStatus};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use wishlist::{WishlistEntry, WishlistEntryDetail};
