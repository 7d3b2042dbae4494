//! Invocation-time overrides for pipeline parameters.
//!
//! A compiled pipeline is built against [`Parameter`] handles. When it is
//! invoked with a [`ParamMap`], each parameter is first looked up in the
//! map; an override replaces the value (or buffer) for that call only. The
//! IR itself is never rewritten.

use rustc_hash::FxHashMap;

use crate::{Buffer, BufferSlot, ImageParam, Param, ParamError, Parameter, ScalarType, ScalarValue};

/// Override table keyed by parameter identity.
#[derive(Default)]
pub struct ParamMap {
    mapping: FxHashMap<usize, ParamArg>,
}

struct ParamArg {
    /// Keeps the key's allocation alive so its address is not reused.
    original: Parameter,
    mapped: Parameter,
    output: Option<BufferSlot>,
}

/// Result of [`ParamMap::map`].
pub struct Mapped<'a> {
    /// The override, or the queried parameter when there is none.
    pub parameter: &'a Parameter,
    /// Where an output buffer should be written, if requested.
    pub output: Option<&'a BufferSlot>,
}

/// One entry of [`ParamMap::from_mappings`].
pub enum ParamMapping {
    Scalar(Parameter, ScalarValue),
    Buffer(ImageParam, Buffer),
    Output(ImageParam, BufferSlot),
}

impl ParamMapping {
    pub fn scalar<T: ScalarType>(param: &Param<T>, value: T) -> Self {
        ParamMapping::Scalar(param.parameter().clone(), value.into_scalar())
    }
}

impl ParamMap {
    /// An empty map; every lookup returns the queried parameter.
    pub fn empty() -> Self {
        ParamMap::default()
    }

    pub fn from_mappings(
        mappings: impl IntoIterator<Item = ParamMapping>,
    ) -> Result<Self, ParamError> {
        let mut map = ParamMap::empty();
        for mapping in mappings {
            match mapping {
                ParamMapping::Scalar(param, value) => map.set_scalar(&param, value)?,
                ParamMapping::Buffer(param, buffer) => map.set_buffer(&param, buffer)?,
                ParamMapping::Output(param, slot) => map.set_output(&param, slot),
            }
        }
        Ok(map)
    }

    /// Override a typed scalar parameter.
    pub fn set<T: ScalarType>(&mut self, param: &Param<T>, value: T) {
        let mapped = Parameter::new(param.ty(), false, 0, param.name());
        mapped.store_scalar(value.into_scalar());
        self.insert(param.parameter(), mapped, None);
    }

    /// Override an untyped scalar parameter.
    pub fn set_scalar(&mut self, param: &Parameter, value: ScalarValue) -> Result<(), ParamError> {
        let mapped = Parameter::new(param.ty(), false, 0, param.name());
        mapped.set_scalar(value)?;
        self.insert(param, mapped, None);
        Ok(())
    }

    /// Bind an input buffer.
    pub fn set_buffer(&mut self, param: &ImageParam, buffer: Buffer) -> Result<(), ParamError> {
        let mapped = Parameter::new(param.ty(), true, param.dimensions(), param.name());
        mapped.set_buffer(buffer)?;
        self.insert(param.parameter(), mapped, None);
        Ok(())
    }

    /// Request that the buffer produced for `param` be written to `slot`.
    pub fn set_output(&mut self, param: &ImageParam, slot: BufferSlot) {
        let mapped = Parameter::new(param.ty(), true, param.dimensions(), param.name());
        self.insert(param.parameter(), mapped, Some(slot));
    }

    /// Replace `original` with an existing parameter of the same type.
    pub fn set_parameter(
        &mut self,
        original: &Parameter,
        mapped: Parameter,
    ) -> Result<(), ParamError> {
        if original.ty() != mapped.ty() {
            return Err(ParamError::MappedTypeMismatch {
                name: original.name().to_owned(),
                expected: original.ty(),
                found: mapped.ty(),
            });
        }
        self.insert(original, mapped, None);
        Ok(())
    }

    fn insert(&mut self, original: &Parameter, mapped: Parameter, output: Option<BufferSlot>) {
        tracing::trace!(
            param = original.name(),
            is_buffer = original.is_buffer(),
            output = output.is_some(),
            "parameter override"
        );
        self.mapping.insert(
            original.addr(),
            ParamArg {
                original: original.clone(),
                mapped,
                output,
            },
        );
    }

    /// The override for `param`, or `param` itself.
    pub fn map<'a>(&'a self, param: &'a Parameter) -> Mapped<'a> {
        match self.mapping.get(&param.addr()) {
            Some(arg) => {
                debug_assert!(arg.original.same_as(param));
                Mapped {
                    parameter: &arg.mapped,
                    output: arg.output.as_ref(),
                }
            }
            None => Mapped {
                parameter: param,
                output: None,
            },
        }
    }

    pub fn contains(&self, param: &Parameter) -> bool {
        self.mapping.contains_key(&param.addr())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
