pub mod news;
pub mod prices;

pub use news::load_news_csv;
pub use prices::load_price_csv;
