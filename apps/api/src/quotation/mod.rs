// Quotation HTTP adapter: form payload mapping and the render/preview endpoints.

pub mod handlers;
pub mod request;
