use fleetscope_core_types::RequestId;
use thiserror::Error;

/// Result type alias for the pure domain layer
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Result type alias for anything that crosses a crate or I/O boundary
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code usable by callers for programmatic
/// handling and by tests for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    ConstraintViolation,

    // Authorization
    PermissionDenied,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::PermissionDenied => "ERR_PERMISSION_DENIED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, entity, request) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the error means the caller is not allowed to see the resource
    pub fn is_permission_denied(&self) -> bool {
        self.kind == ExErrorKind::PermissionDenied
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ExErrorKind::NotFound
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for scope resolution and scope-field validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// Project does not exist or belongs to another tenant
    #[error("Project not found: {project_id}")]
    ProjectNotFound { project_id: String },

    /// Caller is not a member of the project
    #[error("Permission denied for project {project_id}")]
    PermissionDenied { project_id: String },

    /// Application or data stream not found
    #[error("{kind} not found: {entity_id}")]
    EntityNotFound { kind: String, entity_id: String },

    /// Data-driver configuration not found
    #[error("Data driver config not found: {config_id}")]
    ConfigNotFound { config_id: String },

    /// Data-driver stream not found
    #[error("Data driver stream not found: {stream_id}")]
    StreamNotFound { stream_id: String },

    /// Edge not found in the caller's tenant
    #[error("Edge not found: {edge_id}")]
    EdgeNotFound { edge_id: String },

    /// Selector or label references a category that does not exist
    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: String },

    /// Selector or label references a value the category does not allow
    #[error("Category value not found: {category_id}:{value}")]
    CategoryValueNotFound { category_id: String, value: String },

    /// Edge selector type is neither Explicit nor Category
    #[error("Invalid edge selector type: {value}")]
    InvalidSelectorType { value: String },

    /// Entity lists edges that its Explicit-mode project does not contain
    #[error("Edges with IDs {} are not part of project {project_id}", .edge_ids.join(", "))]
    EdgesOutsideProject {
        project_id: String,
        edge_ids: Vec<String>,
    },

    /// Category definition failed validation
    #[error("Invalid category: {reason}")]
    InvalidCategory { reason: String },

    /// An update attempted to move an entity to another project
    #[error("Project of {entity_id} cannot change from {existing} to {requested}")]
    ProjectIdImmutable {
        entity_id: String,
        existing: String,
        requested: String,
    },
}

impl ScopeError {
    /// The canonical kind this domain error maps to
    pub fn kind(&self) -> ExErrorKind {
        match self {
            ScopeError::ProjectNotFound { .. }
            | ScopeError::EntityNotFound { .. }
            | ScopeError::ConfigNotFound { .. }
            | ScopeError::StreamNotFound { .. }
            | ScopeError::EdgeNotFound { .. }
            | ScopeError::CategoryNotFound { .. }
            | ScopeError::CategoryValueNotFound { .. } => ExErrorKind::NotFound,
            ScopeError::PermissionDenied { .. } => ExErrorKind::PermissionDenied,
            ScopeError::InvalidSelectorType { .. }
            | ScopeError::EdgesOutsideProject { .. }
            | ScopeError::InvalidCategory { .. }
            | ScopeError::ProjectIdImmutable { .. } => ExErrorKind::InvalidInput,
        }
    }

    fn subject_id(&self) -> Option<String> {
        match self {
            ScopeError::ProjectNotFound { project_id }
            | ScopeError::PermissionDenied { project_id }
            | ScopeError::EdgesOutsideProject { project_id, .. } => Some(project_id.clone()),
            ScopeError::EntityNotFound { entity_id, .. }
            | ScopeError::ProjectIdImmutable { entity_id, .. } => Some(entity_id.clone()),
            ScopeError::ConfigNotFound { config_id } => Some(config_id.clone()),
            ScopeError::StreamNotFound { stream_id } => Some(stream_id.clone()),
            ScopeError::EdgeNotFound { edge_id } => Some(edge_id.clone()),
            ScopeError::CategoryNotFound { category_id }
            | ScopeError::CategoryValueNotFound { category_id, .. } => Some(category_id.clone()),
            ScopeError::InvalidSelectorType { .. } | ScopeError::InvalidCategory { .. } => None,
        }
    }
}

impl From<ScopeError> for ExError {
    fn from(err: ScopeError) -> Self {
        let mut ex = ExError::new(err.kind()).with_message(err.to_string());
        if let Some(id) = err.subject_id() {
            ex = ex.with_entity_id(id);
        }
        ex
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
