mod book;
mod fetcher;
mod series;

pub use book::PriceBook;
pub use fetcher::{FetchedPrice, PriceFetcher, DEFAULT_API_BASE};
pub use series::PriceSeries;
