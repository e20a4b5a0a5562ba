mod typed;

pub use typed::TypedBuffer;
