pub mod chat_area;
pub mod product_card;
pub mod settings;
