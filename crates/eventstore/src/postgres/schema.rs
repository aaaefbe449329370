use sqlx::PgPool;

use crate::Error;

/// Idempotent DDL. `tagvalues` flattens the values of single-letter
/// tags so `#<letter>` filters can use the GIN index.
pub(crate) const SCHEMA: &str = r#"
CREATE OR REPLACE FUNCTION tags_to_tagvalues(jsonb) RETURNS text[]
    AS 'SELECT array_agg(t->>1) FROM (SELECT jsonb_array_elements($1) AS t) s WHERE length(t->>0) = 1;'
    LANGUAGE SQL
    IMMUTABLE
    RETURNS NULL ON NULL INPUT;

CREATE TABLE IF NOT EXISTS event (
  id text NOT NULL,
  pubkey text NOT NULL,
  created_at bigint NOT NULL,
  kind integer NOT NULL,
  tags jsonb NOT NULL,
  content text NOT NULL,
  sig text NOT NULL,

  tagvalues text[] GENERATED ALWAYS AS (tags_to_tagvalues(tags)) STORED
);

CREATE UNIQUE INDEX IF NOT EXISTS ididx ON event USING btree (id text_pattern_ops);
CREATE INDEX IF NOT EXISTS pubkeyprefix ON event USING btree (pubkey text_pattern_ops);
CREATE INDEX IF NOT EXISTS timeidx ON event (created_at DESC);
CREATE INDEX IF NOT EXISTS kindidx ON event (kind);
CREATE INDEX IF NOT EXISTS kindtimeidx ON event (kind, created_at DESC);
CREATE INDEX IF NOT EXISTS arbitrarytagvalues ON event USING gin (tagvalues);
"#;

/// `IF NOT EXISTS` reports skipped objects as notices; keep them out of the
/// server log on every start.
pub(crate) const QUIET_NOTICES: &str = "SET LOCAL client_min_messages = warning";

/// Held while the DDL runs: concurrent `init` calls apply it one at a time.
const SCHEMA_LOCK_KEY: i64 = 0x6e6f_7374_7200;

pub(crate) async fn init_schema(pool: &PgPool) -> Result<(), Error> {
  let mut tx = pool.begin().await?;

  sqlx::query("SELECT pg_advisory_xact_lock($1)")
    .bind(SCHEMA_LOCK_KEY)
    .execute(&mut *tx)
    .await?;
  sqlx::query(QUIET_NOTICES).execute(&mut *tx).await?;
  sqlx::raw_sql(SCHEMA).execute(&mut *tx).await?;

  tx.commit().await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn notices_are_silenced_only_for_the_schema_transaction() {
    assert_eq!(QUIET_NOTICES, "SET LOCAL client_min_messages = warning");
    assert!(!SCHEMA.contains("client_min_messages"));
  }

}
