//! The sample record written by the initializer.

use crate::model::{RowMutation, TableSpec};

/// Column family created with the table.
pub const COLUMN_FAMILY: &str = "dfdl";

/// Qualifier holding the short schema label.
pub const QUALIFIER_NAME: &str = "name";

/// Qualifier holding the DFDL schema document.
pub const QUALIFIER_DEFINITION: &str = "definition";

/// Prefix of every row key.
pub const ROW_KEY_PREFIX: &str = "rowKey";

/// Index of the row that gets written.
pub const WRITE_ROW_INDEX: u32 = 2;

/// Index of the row read back by key.
pub const READ_ROW_INDEX: u32 = 3;

/// Label stored under `dfdl:name`.
pub const SAMPLE_NAME: &str = "binary-example";

/// DFDL schema stored under `dfdl:definition`.
pub const SAMPLE_DEFINITION: &str = include_str!("schemas/binary_example.dfdl.xsd");

/// Returns the row key for `index`, e.g. `rowKey2`.
pub fn row_key(index: u32) -> String {
    format!("{ROW_KEY_PREFIX}{index}")
}

/// Table layout: a single `dfdl` family with no GC rule.
pub fn table_spec(table_id: &str) -> TableSpec {
    TableSpec::of(table_id).add_family(COLUMN_FAMILY)
}

/// Mutation writing the sample name and definition to `rowKey2`.
pub fn sample_mutation(table_id: &str) -> RowMutation {
    RowMutation::create(table_id, row_key(WRITE_ROW_INDEX))
        .set_cell(COLUMN_FAMILY, QUALIFIER_NAME, SAMPLE_NAME)
        .set_cell(COLUMN_FAMILY, QUALIFIER_DEFINITION, SAMPLE_DEFINITION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_key() {
        assert_eq!(row_key(2), "rowKey2");
        assert_eq!(row_key(WRITE_ROW_INDEX), "rowKey2");
        assert_eq!(row_key(READ_ROW_INDEX), "rowKey3");
    }

    #[test]
    fn test_definition_document() {
        assert!(SAMPLE_DEFINITION.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(SAMPLE_DEFINITION.ends_with("</xs:schema>"));
        assert!(SAMPLE_DEFINITION.contains("<xs:element name=\"binary_example\">"));
        assert_eq!(SAMPLE_DEFINITION.lines().count(), 19);
        assert!(!SAMPLE_DEFINITION.ends_with('\n'));
    }

    #[test]
    fn test_definition_is_byte_exact() {
        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\" targetNamespace=\"http://example.com/dfdl/helloworld/\" xmlns:dfdl=\"http://www.ogf.org/dfdl/dfdl-1.0/\">\n",
            "  <xs:include schemaLocation=\"org/apache/daffodil/xsd/DFDLGeneralFormat.dfdl.xsd\"/>\n",
            "  <xs:annotation>\n",
            "    <xs:appinfo source=\"http://www.ogf.org/dfdl/\">\n",
            "      <dfdl:format ref=\"GeneralFormat\" representation=\"binary\"/>\n",
            "    </xs:appinfo>\n",
            "  </xs:annotation>\n",
            "  <xs:element name=\"binary_example\">\n",
            "    <xs:complexType>\n",
            "      <xs:sequence>\n",
            "        <xs:element name=\"w\" type=\"xs:int\" dfdl:binaryNumberRep=\"binary\" dfdl:byteOrder=\"bigEndian\" dfdl:lengthKind=\"implicit\"/>\n",
            "        <xs:element name=\"x\" type=\"xs:int\" dfdl:binaryNumberRep=\"binary\" dfdl:byteOrder=\"bigEndian\" dfdl:lengthKind=\"implicit\"/>\n",
            "        <xs:element name=\"y\" type=\"xs:double\" dfdl:binaryFloatRep=\"ieee\" dfdl:byteOrder=\"bigEndian\" dfdl:lengthKind=\"implicit\"/>\n",
            "        <xs:element name=\"z\" type=\"xs:float\" dfdl:binaryFloatRep=\"ieee\" dfdl:byteOrder=\"bigEndian\" dfdl:lengthKind=\"implicit\"/>\n",
            "      </xs:sequence>\n",
            "    </xs:complexType>\n",
            "  </xs:element>\n",
            "</xs:schema>",
        );
        assert_eq!(SAMPLE_DEFINITION, expected);
    }

    #[test]
    fn test_sample_mutation() {
        let mutation = sample_mutation("dfdl-schemas");
        assert_eq!(mutation.table_id, "dfdl-schemas");
        assert_eq!(&mutation.row_key[..], b"rowKey2");
        assert_eq!(mutation.cells.len(), 2);
        assert_eq!(mutation.cells[0].family, COLUMN_FAMILY);
        assert_eq!(&mutation.cells[0].value[..], SAMPLE_NAME.as_bytes());
        assert_eq!(&mutation.cells[1].qualifier[..], b"definition");
        assert!(mutation.cells.iter().all(|c| c.timestamp_micros.is_none()));
    }

    #[test]
    fn test_table_spec() {
        let spec = table_spec("t");
        assert_eq!(spec.families.len(), 1);
        assert_eq!(spec.families[0].name, "dfdl");
        assert_eq!(spec.families[0].max_versions, None);
    }
}
