/// Tables owned by the API. Every table carries `owner_id`, indexed for the
/// per-user scans the repository issues.
pub const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        title TEXT NOT NULL CHECK (length(title) > 0),
        description TEXT,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS tasks_owner_idx ON tasks (owner_id, created_at)",
    r#"CREATE TABLE IF NOT EXISTS pomodoro_sessions (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        task_id UUID,
        duration INTEGER NOT NULL CHECK (duration > 0),
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS pomodoro_sessions_owner_idx ON pomodoro_sessions (owner_id, created_at)",
    r#"CREATE TABLE IF NOT EXISTS note_versions (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        note_id TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        format TEXT NOT NULL,
        is_processed BOOLEAN NOT NULL DEFAULT FALSE,
        processing_metadata JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS note_versions_owner_note_idx ON note_versions (owner_id, note_id, created_at)",
    r#"CREATE TABLE IF NOT EXISTS prompts (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        name TEXT NOT NULL CHECK (length(name) > 0),
        template_type TEXT NOT NULL,
        prompt_text TEXT NOT NULL CHECK (length(prompt_text) > 0),
        is_default BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS prompts_owner_idx ON prompts (owner_id, created_at)",
];

/// Table names, in creation order.
pub const TABLES: &[&str] = &["tasks", "pomodoro_sessions", "note_versions", "prompts"];

/// The full DDL script, `;`-terminated.
pub fn script() -> String {
    STATEMENTS.iter().map(|s| format!("{};\n", s)).collect()
}
