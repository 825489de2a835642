pub mod naver;
pub mod traits;

pub use naver::NaverShopClient;
pub use traits::OfferLookup;
