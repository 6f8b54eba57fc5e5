//! Reading and writing single leaf files.
//!
//! Every leaf goes through the same pipeline:
//!
//! ```text
//! plain:     text -> Encoding -> file
//! encrypted: text -> UTF-8 -> Codec::encrypt -> envelope -> Encoding -> file
//! ```
//!
//! Under encryption the store encoding only applies to the envelope text,
//! which is ASCII hex, so envelopes read the same in every encoding.
//! Markers (`LeafKind::Raw`) skip the codec and are always plain text.

use std::path::Path as FsPath;
use std::{fs, io};

use serde_json::Value as JsonValue;

use objfs_core_store::{Codec, CryptoError, Error, Function, FunctionRegistry, Value};

use crate::encoding::Encoding;

/// How a leaf's text is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafKind {
    /// Function source text (`*.js`).
    Function,
    /// JSON document (`*.dat`).
    Data,
    /// Plain text, never encrypted (`.obj` markers).
    Raw,
}

/// Why a present leaf could not be decoded.
#[derive(thiserror::Error, Debug)]
pub enum LeafError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Crypto(#[from] CryptoError),

    #[error("contents are not valid {encoding} text")]
    Text { encoding: Encoding },

    #[error("contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Leaf reader/writer bound to one store's encoding, codec and functions.
#[derive(Clone, Copy)]
pub struct LeafCodec<'a> {
    encoding: Encoding,
    codec: &'a Codec,
    functions: &'a FunctionRegistry,
}

impl<'a> LeafCodec<'a> {
    pub fn new(encoding: Encoding, codec: &'a Codec, functions: &'a FunctionRegistry) -> Self {
        LeafCodec {
            encoding,
            codec,
            functions,
        }
    }

    /// Read a leaf, keeping "missing" (`Ok(None)`) and "corrupt" (`Err`)
    /// apart.
    pub fn try_read(&self, path: &FsPath, kind: LeafKind) -> Result<Option<Value>, LeafError> {
        log::debug!("Reading {}...", path.display());

        let stored = match fs::read(path) {
            Ok(stored) => stored,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let text = match kind {
            LeafKind::Function | LeafKind::Data if self.codec.is_enabled() => {
                let envelope = self.decode(stored)?;
                let plain = self.codec.decrypt(envelope.as_bytes())?;
                String::from_utf8(plain).map_err(|_| LeafError::Text {
                    encoding: Encoding::Utf8,
                })?
            }
            _ => self.decode(stored)?,
        };

        let value = match kind {
            LeafKind::Function => Value::Function(self.functions.bind(text)),
            LeafKind::Data => Value::Data(serde_json::from_str(&text)?),
            LeafKind::Raw => Value::Data(JsonValue::String(text)),
        };
        Ok(Some(value))
    }

    /// Read a leaf. Missing and corrupt leaves are both absent.
    pub fn read(&self, path: &FsPath, kind: LeafKind) -> Option<Value> {
        match self.try_read(path, kind) {
            Ok(value) => value,
            Err(error) => {
                log::warn!("Treating unreadable leaf {} as absent: {}", path.display(), error);
                None
            }
        }
    }

    /// Read a marker file's text.
    pub fn read_raw(&self, path: &FsPath) -> Option<String> {
        match self.read(path, LeafKind::Raw)? {
            Value::Data(JsonValue::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn write_function(&self, path: &FsPath, function: &Function) -> Result<(), Error> {
        self.write(path, LeafKind::Function, function.source())
    }

    pub fn write_data(&self, path: &FsPath, data: &JsonValue) -> Result<(), Error> {
        let text = serde_json::to_string(data).map_err(|e| Error::Encode {
            encoding: "json".to_string(),
            message: e.to_string(),
        })?;
        self.write(path, LeafKind::Data, &text)
    }

    pub fn write_raw(&self, path: &FsPath, text: &str) -> Result<(), Error> {
        self.write(path, LeafKind::Raw, text)
    }

    fn write(&self, path: &FsPath, kind: LeafKind, text: &str) -> Result<(), Error> {
        log::debug!("Writing {}...", path.display());

        let stored = match kind {
            LeafKind::Function | LeafKind::Data if self.codec.is_enabled() => {
                let envelope = self.codec.encrypt(text.as_bytes());
                let envelope = String::from_utf8_lossy(&envelope);
                self.encoding.encode(&envelope)?
            }
            _ => self.encoding.encode(text)?,
        };
        fs::write(path, stored).map_err(|error| Error::io(path, error))
    }

    fn decode(&self, stored: Vec<u8>) -> Result<String, LeafError> {
        self.encoding.decode(stored).ok_or(LeafError::Text {
            encoding: self.encoding,
        })
    }
}
