//! Intermediate representation shared by every backend.
//!
//! - `types`: the IR entities and the closed `IrSchema` union
//! - `serialize`: `stringify_ir` / `parse_ir`

mod serialize;
mod types;

pub use serialize::{IrError, parse_ir, stringify_ir};
pub use types::{
    AdditionalPropertiesIr, ContentKind, HttpMethod, IR_VERSION, Ir, IrInfo, IrModel, IrOperation,
    IrParam, IrRequestBody, IrResponse, IrSchema, ObjectSchema, ParamLocation, PrimitiveType,
};
