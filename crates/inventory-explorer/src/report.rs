use inventory_core::models::FilterSpec;
use inventory_runtime::session::Snapshot;
use inventory_runtime::store::BatchReport;
use serde_json::{json, Value};

/// JSON document printed to stdout after a run.
pub fn build_report(batch: &BatchReport, filter: &FilterSpec, snapshot: &Snapshot) -> Value {
    let files: Vec<Value> = batch
        .files
        .iter()
        .map(|f| {
            json!({
                "name": f.file_name,
                "size_bytes": f.file_size,
                "records": f.record_count,
                "rows_dropped": f.diagnostics.rows_dropped(),
                "decode_failures": f.diagnostics.decode_failures.len(),
            })
        })
        .collect();

    json!({
        "files": files,
        "filter": filter,
        "resources": {
            "total": snapshot.total,
            "filtered": snapshot.filtered,
        },
        "summary": snapshot.summary,
        "tag_coverage": snapshot.tag_coverage,
        "by_service": snapshot.aggregates.by_service,
        "by_region": snapshot.aggregates.by_region,
        "by_account": snapshot.aggregates.by_account,
        "by_category": snapshot.aggregates.by_category,
        "tag_frequency": snapshot.aggregates.tag_frequency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_runtime::session::ExplorerSession;
    use inventory_runtime::store::{InventoryStore, Upload};

    #[tokio::test]
    async fn test_build_report() {
        let csv = "accountid,region,service,resource_type,tags_json\n\
            111,us-east-1,ec2,instance,\"{\"\"env\"\":\"\"prod\"\"}\"\n\
            111,us-east-1,ec2,instance,{broken\n";
        let mut session = ExplorerSession::new(InventoryStore::new());
        let batch = session
            .ingest_batch(vec![Upload::new("a.csv", csv)])
            .await
            .expect("ingest");
        session.set_filter(FilterSpec::all().with_region("us-east-1"));
        let filter = session.filter().clone();
        let report = build_report(&batch, &filter, session.snapshot());

        assert_eq!(report["files"][0]["name"], "a.csv");
        assert_eq!(report["files"][0]["records"], 2);
        assert_eq!(report["files"][0]["decode_failures"], 1);
        assert_eq!(report["resources"]["filtered"], 2);
        assert_eq!(report["filter"]["region"], "us-east-1");
        assert_eq!(report["by_service"][0]["service"], "ec2");
        assert_eq!(report["by_service"][0]["count"], 2);
        assert_eq!(report["by_region"][0]["name"], "N. Virginia");
        assert_eq!(report["tag_frequency"][0]["tag"], "env");
        assert_eq!(report["tag_coverage"]["tagged"], 1);
    }
}
