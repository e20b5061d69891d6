pub mod convert;
mod registry;

pub use convert::{ConvertCurrencyTool, CONVERT_TOOL_NAME};
pub use registry::{
    json_schema_number, json_schema_object, json_schema_string, Tool, ToolRegistry,
};
