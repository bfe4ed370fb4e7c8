pub const CREATE_CALLS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS calls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        caller TEXT NOT NULL,
        contract TEXT NOT NULL,
        selector TEXT NOT NULL,
        ok INTEGER NOT NULL,
        value TEXT NOT NULL
    )";

pub const CREATE_CONTRACTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS contracts (
        address TEXT PRIMARY KEY,
        code TEXT NOT NULL,
        deployer TEXT NOT NULL,
        version INTEGER NOT NULL
    )";

pub const CREATE_CONTRACTS_DEPLOYER_INDEX: &str = "
    CREATE INDEX IF NOT EXISTS idx_contracts_deployer ON contracts (deployer)";

pub const CREATE_CONTRACT_STATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS contract_state (
        address TEXT NOT NULL,
        path TEXT NOT NULL,
        version INTEGER NOT NULL,
        value BLOB,
        deleted INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (address, path, version)
    )";

pub const CREATE_EVENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        version INTEGER NOT NULL,
        contract TEXT NOT NULL,
        value BLOB NOT NULL
    )";

pub const CREATE_EVENTS_CONTRACT_INDEX: &str = "
    CREATE INDEX IF NOT EXISTS idx_events_contract ON events (contract, id)";

pub async fn initialize_database(conn: &libsql::Connection) -> Result<(), libsql::Error> {
    for statement in [
        CREATE_CALLS_TABLE,
        CREATE_CONTRACTS_TABLE,
        CREATE_CONTRACTS_DEPLOYER_INDEX,
        CREATE_CONTRACT_STATE_TABLE,
        CREATE_EVENTS_TABLE,
        CREATE_EVENTS_CONTRACT_INDEX,
    ] {
        conn.execute(statement, ()).await?;
    }
    conn.query("PRAGMA journal_mode = WAL;", ()).await?;
    conn.query("PRAGMA synchronous = NORMAL;", ()).await?;
    Ok(())
}
