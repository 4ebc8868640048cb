// Scrape domain - scraped objects, their validation rules and input parsing

pub mod domain;
pub mod parser;
pub mod validation;
