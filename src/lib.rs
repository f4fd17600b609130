//! shadertune — live-tunable shader preprocessing for SDF ray marchers.
//!
//! Shader source may declare tunable scalars inline with a
//! `VAR_<name>(min=.., max=.., start=.., step=..)` tag. This crate extracts
//! those declarations into an ordered [`VariableTable`], rewrites the source
//! so the surrounding code keeps compiling, and synthesizes the
//! constant-buffer header that binds each variable to a live value at render
//! time.
//!
//! Extraction runs as a two-pass compile protocol (see [`compile`]):
//! a **collect** pass at reduced optimization populates the table while
//! rewriting each declaration to a placeholder literal, then a **generate**
//! pass at full optimization rewrites declarations to identifiers that the
//! synthesized `cbuffer` header declares. The external compiler sits behind
//! the [`ShaderCompiler`] trait and file access behind the
//! [`ShaderIncluder`], so the protocol is testable without a GPU toolchain.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod compile;
pub mod errors;
pub mod includer;
pub mod manager;
pub mod scenes;
pub mod utils;
pub mod variables;

pub use compile::{
    CompileRequest, CompiledShader, CompilerOutput, IncludeResolver, Optimization, ShaderCompiler,
    compile_single, compile_with_variables,
};
pub use errors::{Result, ShaderTuneError};
pub use includer::{ResolvedSource, ShaderIncluder, Substitution};
pub use manager::{ShaderPass, VARIABLE_TAG, VARIABLES_HEADER_NAME, VariableManager};
pub use scenes::{SCENE_HEADER_NAME, SceneLibrary};
pub use variables::{Variable, VariableTable};
