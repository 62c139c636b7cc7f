//! Scalar UDFs backed by in-memory lookup tables.

use crate::error::SqlResult;
use datafusion::arrow::array::{ArrayRef, AsArray, StringBuilder};
use datafusion::arrow::datatypes::{DataType, Int64Type};
use datafusion::common::{DataFusionError, Result as DFResult};
use datafusion::logical_expr::{
    ColumnarValue, ScalarFunctionArgs, ScalarUDF, ScalarUDFImpl, Signature, Volatility,
};
use datafusion::prelude::SessionContext;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maps an integer code to a label, falling back to a default.
#[derive(Debug)]
struct LookupUdf {
    name: String,
    signature: Signature,
    table: HashMap<i64, String>,
    default: String,
}

impl ScalarUDFImpl for LookupUdf {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn return_type(&self, _arg_types: &[DataType]) -> DFResult<DataType> {
        Ok(DataType::Utf8)
    }

    fn invoke_with_args(&self, args: ScalarFunctionArgs) -> DFResult<ColumnarValue> {
        let arrays = ColumnarValue::values_to_arrays(&args.args)?;
        let codes = arrays
            .first()
            .and_then(|array| array.as_primitive_opt::<Int64Type>())
            .ok_or_else(|| DataFusionError::Execution(format!("{} expects one Int64 argument", self.name)))?;

        let mut labels = StringBuilder::with_capacity(codes.len(), codes.len() * 8);
        for code in codes.iter() {
            match code {
                Some(code) => {
                    labels.append_value(self.table.get(&code).unwrap_or(&self.default));
                }
                None => labels.append_null(),
            }
        }
        let result: ArrayRef = Arc::new(labels.finish());
        Ok(ColumnarValue::Array(result))
    }
}

/// Register `name(code BIGINT) -> VARCHAR` that looks codes up in `table`.
pub fn register_lookup_udf(
    ctx: &SessionContext,
    name: &str,
    table: HashMap<i64, String>,
    default: &str,
) -> SqlResult<()> {
    debug!(name, entries = table.len(), "registering lookup udf");
    let udf = LookupUdf {
        name: name.to_string(),
        signature: Signature::exact(vec![DataType::Int64], Volatility::Immutable),
        table,
        default: default.to_string(),
    };
    ctx.register_udf(ScalarUDF::new_from_impl(udf));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::collect_rows;

    #[tokio::test]
    async fn test_lookup_udf_maps_codes() {
        let ctx = SessionContext::new();
        let table = HashMap::from([(1, "Electronics".to_string()), (2, "Books".to_string())]);
        register_lookup_udf(&ctx, "category_name", table, "UNKNOWN").unwrap();

        let df = ctx
            .sql("SELECT category_name(column1) FROM (VALUES (1), (2), (7)) AS t(column1)")
            .await
            .unwrap();
        let rows = collect_rows(df).await.unwrap();
        assert_eq!(
            rows,
            vec![vec!["Electronics"], vec!["Books"], vec!["UNKNOWN"]]
        );
    }
}
