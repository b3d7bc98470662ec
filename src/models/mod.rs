mod url;

pub use url::{DecodeQuery, EncodeRequest, Link, Visit};
