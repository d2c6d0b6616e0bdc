//! xlsxjson - Stateless Excel upload endpoint that returns the first sheet as JSON
//!
//! This crate validates an uploaded spreadsheet (XLSX or XLS), decodes it with
//! `calamine`, and projects the first sheet into JSON, either as raw rows or as
//! header-keyed row objects. The HTTP server and multipart parsing are left to
//! the caller: build an [`UploadRequest`] from whatever framework you use and
//! send the returned [`Response`] back.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxjson::{EndpointBuilder, UploadRequest, UploadedFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create an endpoint with default settings (5MiB limit, XLSX and XLS)
//!     let endpoint = EndpointBuilder::new().build()?;
//!
//!     let bytes = std::fs::read("example.xlsx")?;
//!     let upload = UploadedFile::new(
//!         "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
//!         bytes,
//!     );
//!
//!     let response = endpoint.handle(&UploadRequest::post(upload));
//!     println!("{} {}", response.status, response.body_text());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust
//! use xlsxjson::{EndpointBuilder, ProjectionMode, SpreadsheetFormat, StatusCode};
//!
//! # fn main() -> Result<(), xlsxjson::XlsxToJsonError> {
//! let endpoint = EndpointBuilder::new()
//!     .with_max_upload_size(10 * 1024 * 1024)
//!     .with_accepted_formats(vec![SpreadsheetFormat::Xlsx])
//!     .with_projection_mode(ProjectionMode::RowsAsArrays)
//!     .with_method_rejection(StatusCode::BAD_REQUEST, "Send an XLSX file via POST")
//!     .with_diagnostic_headers(true)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Projection Only
//!
//! ```rust
//! use xlsxjson::{CellValue, ProjectionMode, Sheet, SheetProjector};
//!
//! let sheet = Sheet::new(vec![
//!     vec![CellValue::from("h1"), CellValue::from("h2")],
//!     vec![CellValue::Number(1.0)],
//! ]);
//! let json = SheetProjector::new(ProjectionMode::RowsAsObjects)
//!     .project(&sheet)
//!     .to_json_bytes()
//!     .unwrap();
//! assert_eq!(json, br#"{"data":[{"h1":1,"h2":null}],"totalRows":1,"totalColumns":2}"#);
//! ```

mod api;
mod builder;
mod decoder;
mod error;
mod projector;
mod response;
mod types;
mod validator;

// 公開API
pub use api::{ProjectionMode, SpreadsheetFormat};
pub use builder::{Endpoint, EndpointBuilder, HandlerError};
pub use decoder::{CalamineDecoder, SpreadsheetDecoder};
pub use error::XlsxToJsonError;
pub use projector::{ProjectedResult, RowObject, SheetProjector, TableResult};
pub use response::{
    Response, StatusCode, ALLOW_HEADER, FILE_TYPE_HEADER, PROCESSING_TIME_HEADER,
};
pub use types::{CellValue, FormField, Sheet, UploadRequest, UploadedFile};
pub use validator::{Rejection, RejectionText};
