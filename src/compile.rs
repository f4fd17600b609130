//! Compile orchestration.
//!
//! [`compile_with_variables`] drives one shader (re)load cycle:
//!
//! 1. **Reset** — clear the variable table and the includer's header cache.
//! 2. **Collect pass** — compile at reduced optimization; the binary is
//!    discarded, the run only exists to populate the variable table through
//!    [`VariableManager::parse_source`].
//! 3. **Header registration** — the synthesized constant-buffer header goes
//!    into the includer under [`VARIABLES_HEADER_NAME`].
//! 4. **Generate pass** — compile at full optimization; declarations now
//!    rewrite to identifiers the header declares. This binary is the result.
//!
//! Any failure aborts the whole attempt; the caller keeps whatever shader it
//! had adopted before. Re-triggering a reload always restarts from Reset.
//!
//! The external compiler sits behind [`ShaderCompiler`] and receives its
//! include lookups through [`IncludeResolver`], so tests can substitute an
//! in-memory toolchain.

use crate::errors::{Result, ShaderTuneError};
use crate::includer::{ResolvedSource, ShaderIncluder};
use crate::manager::{ShaderPass, VARIABLES_HEADER_NAME, VariableManager};

/// Optimization level requested from the external compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimization {
    /// Fast compile for the collect pass; the binary is thrown away.
    Reduced,
    /// Full optimization for the binary that actually renders.
    Full,
}

/// One compiler invocation's target.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    /// Logical name of the root file, resolved through the includer.
    pub filename: &'a str,
    /// Entry point, e.g. `ps_main`.
    pub entry: &'a str,
    /// Target profile, e.g. `ps_5_0`.
    pub profile: &'a str,
}

/// What the external compiler returned for one invocation.
///
/// `binary: None` is a hard failure; `binary: Some` with diagnostics is a
/// success with warnings.
#[derive(Debug)]
pub struct CompilerOutput {
    pub binary: Option<Vec<u8>>,
    pub diagnostics: Option<String>,
}

/// A successfully compiled shader.
#[derive(Debug)]
pub struct CompiledShader {
    pub binary: Vec<u8>,
    /// Non-fatal diagnostic text, if the compiler emitted any.
    pub warnings: Option<String>,
}

/// Per-include source lookup handed to the compiler.
pub trait IncludeResolver {
    /// Load the source text behind a logical include name.
    fn load(&mut self, filename: &str) -> Result<String>;
}

/// External shader compiler boundary (`D3DCompile` in the original
/// toolchain).
///
/// Implementations resolve `#include` directives through the supplied
/// resolver and must not cache across invocations: the same logical name
/// yields different text per pass.
pub trait ShaderCompiler {
    fn compile(
        &self,
        source: &str,
        request: &CompileRequest<'_>,
        optimization: Optimization,
        includes: &mut dyn IncludeResolver,
    ) -> CompilerOutput;
}

/// One compile attempt's shared state: the includer, the optional variable
/// manager, and the pass both operate under.
struct CompileSession<'a> {
    includer: &'a mut ShaderIncluder,
    manager: Option<&'a mut VariableManager>,
    pass: ShaderPass,
}

impl IncludeResolver for CompileSession<'_> {
    fn load(&mut self, filename: &str) -> Result<String> {
        match self.includer.resolve(filename)? {
            ResolvedSource::Header(code) => Ok(code),
            ResolvedSource::File(code) => {
                let Some(manager) = self.manager.as_deref_mut() else {
                    return Ok(code);
                };
                let rewritten = manager.parse_source(&code, self.pass)?;
                // keep the registered header in step with whatever this
                // load just collected
                self.includer
                    .register_header(VARIABLES_HEADER_NAME, manager.generate_header());
                Ok(rewritten)
            }
        }
    }
}

/// Run the two-pass collect/generate sequence for a shader with tunable
/// variables.
pub fn compile_with_variables(
    compiler: &dyn ShaderCompiler,
    includer: &mut ShaderIncluder,
    manager: &mut VariableManager,
    request: &CompileRequest<'_>,
) -> Result<CompiledShader> {
    manager.reset();
    includer.clear_headers();
    includer.register_header(VARIABLES_HEADER_NAME, manager.generate_header());

    log::debug!("collect pass for \"{}\"", request.filename);
    run_pass(
        compiler,
        includer,
        Some(&mut *manager),
        ShaderPass::Collect,
        Optimization::Reduced,
        request,
    )?;

    includer.register_header(VARIABLES_HEADER_NAME, manager.generate_header());

    log::debug!(
        "generate pass for \"{}\" ({} variables)",
        request.filename,
        manager.variables().len()
    );
    run_pass(
        compiler,
        includer,
        Some(manager),
        ShaderPass::Generate,
        Optimization::Full,
        request,
    )
}

/// Compile a shader that declares no tunable variables: one pass, no
/// rewriting, substitution-aware loading only.
pub fn compile_single(
    compiler: &dyn ShaderCompiler,
    includer: &mut ShaderIncluder,
    request: &CompileRequest<'_>,
) -> Result<CompiledShader> {
    run_pass(
        compiler,
        includer,
        None,
        ShaderPass::Combined,
        Optimization::Full,
        request,
    )
}

fn run_pass(
    compiler: &dyn ShaderCompiler,
    includer: &mut ShaderIncluder,
    manager: Option<&mut VariableManager>,
    pass: ShaderPass,
    optimization: Optimization,
    request: &CompileRequest<'_>,
) -> Result<CompiledShader> {
    let mut session = CompileSession {
        includer,
        manager,
        pass,
    };

    let source = session.load(request.filename)?;
    let output = compiler.compile(&source, request, optimization, &mut session);

    match output.binary {
        Some(binary) => {
            if let Some(diagnostics) = &output.diagnostics {
                log::warn!(
                    "shader \"{}\" compiled with warnings:\n{diagnostics}",
                    request.filename
                );
            }
            Ok(CompiledShader {
                binary,
                warnings: output.diagnostics,
            })
        }
        None => Err(ShaderTuneError::Compile {
            file: request.filename.to_owned(),
            diagnostics: output.diagnostics.unwrap_or_default(),
        }),
    }
}
