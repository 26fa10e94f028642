pub mod fixture;
pub mod newsapi;

pub use fixture::FixtureProvider;
pub use newsapi::NewsApiProvider;
