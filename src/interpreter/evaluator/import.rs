use tracing::debug;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        lexer::tokenize,
        parser::statement::StatementParser,
        value::core::Value,
    },
};

impl Interpreter {
    /// Evaluates `import "path"`.
    ///
    /// The path is resolved against the configured import root. The file is
    /// tokenized and parsed with a parser of its own, and its statements run
    /// in the current scope as they complete, so the definitions it makes are
    /// visible to the importing code.
    ///
    /// # Parameters
    /// - `path`: The path as written in the script.
    /// - `line`: Line of the `import` statement.
    ///
    /// # Returns
    /// The value of the last statement of the imported file. Any failure,
    /// including a syntax or runtime error inside the file, is reported as
    /// `ImportFailed`.
    pub(crate) fn eval_import(&mut self, path: &str, line: usize) -> EvalResult<Value> {
        let resolved = self.config.import_root.join(path);
        debug!(path, resolved = %resolved.display(), line, "import");

        let failed = |reason: String| RuntimeError::ImportFailed { path: path.to_string(),
                                                                   reason,
                                                                   line };

        let source = std::fs::read_to_string(&resolved).map_err(|e| failed(e.to_string()))?;
        let tokens = tokenize(&source, 1).map_err(|e| failed(e.to_string()))?;

        let mut parser = StatementParser::new();
        self.feed_tokens(&mut parser, tokens, true).map_err(|e| failed(e.to_string()))
    }
}
