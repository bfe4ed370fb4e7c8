use libsql::{Connection, Row, params};
use thiserror::Error as ThisError;

use crate::{
    database::types::{CallRow, ContractRow, ContractStateRow, EventRow},
    runtime::Address,
};

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("LibSQL error: {0}")]
    LibSQL(#[from] libsql::Error),
    #[error("Invalid address in column {0}: {1}")]
    InvalidAddress(&'static str, String),
}

fn address_column(row: &Row, idx: i32, name: &'static str) -> Result<Address, Error> {
    let s = row.get::<String>(idx)?;
    s.parse().map_err(|_| Error::InvalidAddress(name, s))
}

pub async fn insert_call(conn: &Connection, call: CallRow) -> Result<i64, Error> {
    conn.execute(
        "INSERT INTO calls (caller, contract, selector, ok, value) VALUES (?, ?, ?, ?, ?)",
        params![
            call.caller.to_string(),
            call.contract.to_string(),
            call.selector,
            call.ok as i64,
            call.value
        ],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

pub async fn select_calls(conn: &Connection) -> Result<Vec<CallRow>, Error> {
    let mut rows = conn
        .query(
            "SELECT id, caller, contract, selector, ok, value FROM calls ORDER BY id ASC",
            params![],
        )
        .await?;
    let mut calls = Vec::new();
    while let Some(row) = rows.next().await? {
        calls.push(
            CallRow::builder()
                .id(row.get::<i64>(0)?)
                .caller(address_column(&row, 1, "caller")?)
                .contract(address_column(&row, 2, "contract")?)
                .selector(row.get::<String>(3)?)
                .ok(row.get::<i64>(4)? != 0)
                .value(row.get::<String>(5)?)
                .build(),
        );
    }
    Ok(calls)
}

pub async fn insert_contract(conn: &Connection, contract: ContractRow) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO contracts (address, code, deployer, version) VALUES (?, ?, ?, ?)",
        params![
            contract.address.to_string(),
            contract.code,
            contract.deployer.to_string(),
            contract.version
        ],
    )
    .await?;
    Ok(())
}

pub async fn get_contract(conn: &Connection, address: &Address) -> Result<Option<ContractRow>, Error> {
    let mut rows = conn
        .query(
            "SELECT address, code, deployer, version FROM contracts WHERE address = ?",
            params![address.to_string()],
        )
        .await?;
    Ok(match rows.next().await? {
        Some(row) => Some(
            ContractRow::builder()
                .address(address_column(&row, 0, "address")?)
                .code(row.get::<String>(1)?)
                .deployer(address_column(&row, 2, "deployer")?)
                .version(row.get::<i64>(3)?)
                .build(),
        ),
        None => None,
    })
}

pub async fn count_contracts_by_deployer(conn: &Connection, deployer: &Address) -> Result<u64, Error> {
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM contracts WHERE deployer = ?",
            params![deployer.to_string()],
        )
        .await?;
    Ok(match rows.next().await? {
        Some(row) => row.get::<i64>(0)? as u64,
        None => 0,
    })
}

pub async fn insert_contract_state(conn: &Connection, row: ContractStateRow) -> Result<u64, Error> {
    Ok(conn
        .execute(
            r#"
            INSERT OR REPLACE INTO contract_state (
                address,
                path,
                version,
                value,
                deleted
            ) VALUES (?, ?, ?, ?, ?)
        "#,
            params![
                row.address.to_string(),
                row.path,
                row.version,
                row.value,
                row.deleted as i64
            ],
        )
        .await?)
}

async fn select_contract_state_value(
    conn: &Connection,
    address: &Address,
    path: &str,
    version: i64,
) -> Result<Option<Vec<u8>>, Error> {
    let mut rows = conn
        .query(
            r#"
            SELECT value, deleted
            FROM contract_state
            WHERE address = ? AND path = ? AND version <= ?
            ORDER BY version DESC
            LIMIT 1
            "#,
            params![address.to_string(), path, version],
        )
        .await?;
    Ok(match rows.next().await? {
        Some(row) if row.get::<i64>(1)? == 0 => Some(row.get::<Vec<u8>>(0)?),
        _ => None,
    })
}

pub async fn get_latest_contract_state_value(
    conn: &Connection,
    address: &Address,
    path: &str,
) -> Result<Option<Vec<u8>>, Error> {
    select_contract_state_value(conn, address, path, i64::MAX).await
}

pub async fn get_contract_state_value_at(
    conn: &Connection,
    address: &Address,
    path: &str,
    version: i64,
) -> Result<Option<Vec<u8>>, Error> {
    select_contract_state_value(conn, address, path, version).await
}

pub async fn insert_event(conn: &Connection, event: EventRow) -> Result<i64, Error> {
    conn.execute(
        "INSERT INTO events (version, contract, value) VALUES (?, ?, ?)",
        params![event.version, event.contract.to_string(), event.value],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

pub async fn select_events(conn: &Connection, contract: &Address) -> Result<Vec<EventRow>, Error> {
    let mut rows = conn
        .query(
            "SELECT version, contract, value FROM events WHERE contract = ? ORDER BY id ASC",
            params![contract.to_string()],
        )
        .await?;
    let mut events = Vec::new();
    while let Some(row) = rows.next().await? {
        events.push(
            EventRow::builder()
                .version(row.get::<i64>(0)?)
                .contract(address_column(&row, 1, "contract")?)
                .value(row.get::<Vec<u8>>(2)?)
                .build(),
        );
    }
    Ok(events)
}
