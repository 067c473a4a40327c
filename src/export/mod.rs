pub mod hocr;

pub use hocr::HocrWriter;
