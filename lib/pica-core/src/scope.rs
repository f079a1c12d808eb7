use indexmap::IndexMap;

use crate::{PicaError, ScriptValue};

/// Name of the scope binding holding the base URL prefixed to every request URL.
pub const BASE_URL: &str = "baseUrl";

/// Read access to the scripting runtime's variable bindings.
///
/// The runtime owns and mutates its scope; the request engine only ever reads
/// a snapshot of it while building one request.
pub trait Scope {
    /// Looks up a binding by name.
    fn lookup(&self, name: &str) -> Option<ScriptValue>;
}

/// The parameter bag bound to a method name, e.g. `post`.
pub type ParameterBag = IndexMap<String, ScriptValue>;

/// Typed accessors over any [`Scope`].
pub trait ScopeExt: Scope {
    /// Returns the parameter bag bound to the lower-cased method name.
    ///
    /// A missing binding is `Ok(None)`, a binding that is not a map is a
    /// [`PicaError::MalformedScope`].
    fn method_params(&self, method: &str) -> Result<Option<ParameterBag>, PicaError> {
        let name = method.to_lowercase();
        match self.lookup(&name) {
            None => Ok(None),
            Some(ScriptValue::Map(bag)) => Ok(Some(bag)),
            Some(other) => Err(PicaError::MalformedScope {
                name,
                expected: "map",
                kind: other.kind(),
            }),
        }
    }

    /// Returns the base URL binding, empty when unbound.
    fn base_url(&self) -> Result<String, PicaError> {
        match self.lookup(BASE_URL) {
            None => Ok(String::new()),
            Some(ScriptValue::Text(url)) => Ok(url),
            Some(other) => Err(PicaError::MalformedScope {
                name: BASE_URL.to_string(),
                expected: "string",
                kind: other.kind(),
            }),
        }
    }
}

impl<S> ScopeExt for S where S: Scope + ?Sized {}

/// In-memory scope, used by the command line and in tests.
#[derive(Debug, Clone, Default)]
pub struct RuntimeScope {
    bindings: IndexMap<String, ScriptValue>,
}

impl RuntimeScope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value to a name, replacing any previous binding.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<ScriptValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Binds a value to a name in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ScriptValue>) {
        self.bindings.insert(name.into(), value.into());
    }

    /// Binds the parameter bag of a method, the name is lower-cased.
    pub fn with_params<K, V>(self, method: &str, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ScriptValue>,
    {
        let bag = params.into_iter().collect::<ScriptValue>();
        self.bind(method.to_lowercase(), bag)
    }
}

impl Scope for RuntimeScope {
    fn lookup(&self, name: &str) -> Option<ScriptValue> {
        self.bindings.get(name).cloned()
    }
}

impl Scope for IndexMap<String, ScriptValue> {
    fn lookup(&self, name: &str) -> Option<ScriptValue> {
        self.get(name).cloned()
    }
}
