//! Moving data between RDDs and DataFrames.

use crate::columnar::ToRecordBatch;
use crate::error::SqlResult;
use dalgo_core::{Data, FlowContext, FlowRdd};
use datafusion::dataframe::DataFrame;
use tracing::debug;

/// Collect `rdd` and expose it as a DataFrame of the context's SQL session.
pub fn rdd_to_dataframe<T>(ctx: &FlowContext, rdd: &FlowRdd<T>) -> SqlResult<DataFrame>
where
    T: Data + ToRecordBatch,
{
    let rows = rdd.collect()?;
    debug!(rdd_id = rdd.id(), rows = rows.len(), "converting RDD to DataFrame");
    let batch = T::to_record_batch(rows)?;
    Ok(ctx.sql().read_batch(batch)?)
}

/// Register `rdd` as a table that SQL queries can reference by `name`.
pub fn register_rdd<T>(ctx: &FlowContext, name: &str, rdd: &FlowRdd<T>) -> SqlResult<()>
where
    T: Data + ToRecordBatch,
{
    let rows = rdd.collect()?;
    let batch = T::to_record_batch(rows)?;
    ctx.sql().register_batch(name, batch)?;
    Ok(())
}
