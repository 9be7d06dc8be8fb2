use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::validation::is_blank;

/// reference to a file attached to a form field. the contents of the file
/// are never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub file_name: String,
    pub size: u64,
}

impl FileRef {
    pub fn new<N>(file_name: N, size: u64) -> Self
    where
        N: Into<String>
    {
        FileRef {
            file_name: file_name.into(),
            size,
        }
    }

    /// creates a reference from the metadata of the given path
    pub fn from_path<P>(path: P) -> std::io::Result<Self>
    where
        P: AsRef<Path>
    {
        let path_ref = path.as_ref();
        let metadata = std::fs::metadata(path_ref)?;

        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("\"{}\" is not a file", path_ref.display())
            ));
        }

        let file_name = path_ref.file_name()
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(FileRef {
            file_name,
            size: metadata.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(Option<FileRef>),
}

impl FieldValue {
    /// a text value is blank when it only contains whitespace, a file value
    /// when nothing is attached.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => is_blank(text),
            FieldValue::File(file) => file.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            FieldValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::File(file) => file.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, Default)]
pub struct Form {
    classes: Vec<String>,
    fields: Vec<Field>,
}

impl Form {
    pub fn new() -> Self {
        Form {
            classes: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_class<C>(mut self, class: C) -> Self
    where
        C: Into<String>
    {
        self.classes.push(class.into());
        self
    }

    pub fn text<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Text(value.into())
        });
        self
    }

    pub fn file<N>(mut self, name: N, file: Option<FileRef>) -> Self
    where
        N: Into<String>
    {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::File(file)
        });
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|v| v == class)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.value)
    }

    /// updates a text field. returns false if the field does not exist or
    /// is not a text field.
    pub fn set_text<V>(&mut self, name: &str, value: V) -> bool
    where
        V: Into<String>
    {
        match self.get_mut(name) {
            Some(FieldValue::Text(text)) => {
                *text = value.into();
                true
            },
            _ => false
        }
    }

    /// attaches a file to a file field. returns false if the field does not
    /// exist or is not a file field.
    pub fn attach(&mut self, name: &str, file: FileRef) -> bool {
        match self.get_mut(name) {
            Some(FieldValue::File(attached)) => {
                *attached = Some(file);
                true
            },
            _ => false
        }
    }

    pub fn detach(&mut self, name: &str) -> bool {
        match self.get_mut(name) {
            Some(FieldValue::File(attached)) => {
                *attached = None;
                true
            },
            _ => false
        }
    }
}
