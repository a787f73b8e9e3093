use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value, json};

/// JSON schema primitive types supported for tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolParamType {
    String,
}

impl ToolParamType {
    fn as_str(self) -> &'static str {
        match self {
            ToolParamType::String => "string",
        }
    }
}

/// One function parameter definition.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: String,
    pub description: Option<String>,
    pub kind: ToolParamType,
    pub required: bool,
}

impl ToolParam {
    pub fn required(name: impl Into<String>, kind: ToolParamType, description: &str) -> Self {
        Self {
            name: name.into(),
            description: Some(description.to_string()),
            kind,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ToolParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// Callable function exposed to the reasoning service.
#[derive(Debug, Clone)]
pub struct ToolFunction {
    pub name: String,
    pub description: String,
    pub params: Vec<ToolParam>,
}

impl ToolFunction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    /// Parameter schema in JSON-schema object form.
    ///
    /// Optional parameters are declared but left out of `required`, so a model
    /// may omit them entirely.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut param_def = Map::new();
            param_def.insert("type".to_string(), json!(param.kind.as_str()));
            if let Some(description) = &param.description {
                param_def.insert("description".to_string(), json!(description));
            }
            properties.insert(param.name.clone(), Value::Object(param_def));
            if param.required {
                required.push(json!(param.name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("additionalProperties".to_string(), Value::Bool(false));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

/// Tool wrapper matching the chat-completions function-calling schema.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub function: ToolFunction,
}

impl ToolDefinition {
    pub fn from_function(function: ToolFunction) -> Self {
        Self { function }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.function.name,
                "description": self.function.description,
                "parameters": self.function.parameters_schema(),
            }
        })
    }
}

/// Tool call emitted by a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Provider-generated call id.
    pub id: String,
    pub name: String,
    /// Decoded arguments; kept as a raw string when the model sent invalid JSON.
    pub args: Value,
}

impl ToolCall {
    /// Builds a call from the wire `arguments` string.
    pub fn from_wire(id: impl Into<String>, name: impl Into<String>, arguments: &str) -> Self {
        let args = if arguments.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(arguments).unwrap_or_else(|_| Value::String(arguments.to_string()))
        };
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    /// Decodes the arguments into a typed parameter struct.
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.args {
            Value::String(raw) => serde_json::from_str(raw),
            other => serde_json::from_value(other.clone()),
        }
    }

    fn args_as_string(&self) -> String {
        match &self.args {
            Value::String(value) => value.clone(),
            other => other.to_string(),
        }
    }
}

impl Serialize for ToolCall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ToolCall", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", "function")?;
        state.serialize_field(
            "function",
            &json!({
                "name": self.name,
                "arguments": self.args_as_string(),
            }),
        )?;
        state.end()
    }
}
