//! Integration tests running filter stages over a parsed data set.

use std::sync::Arc;

use thermocurate::schema::{
    FilterByElementsSchema, FilterByEnvironmentsSchema, FilterByPropertyTypesSchema,
    FilterBySubstancesSchema,
};
use thermocurate::stages::{
    filter_by_elements, filter_by_environments, filter_by_property_types, filter_by_substances,
};
use thermocurate::{
    AnnotatedToolkit, ChemicalEnvironment, CurationError, MeasurementTable, StageKind,
    StageRegistry, Substance, TableParser, Workflow, WorkflowSchema,
};

const HEADER: &str = "Temperature (K),Pressure (kPa),Phase,N Components,\
    Component 1,Role 1,Mole Fraction 1,Exact Amount 1,\
    Component 2,Role 2,Mole Fraction 2,Exact Amount 2,\
    Density Value (g / ml),Density Uncertainty (g / ml),\
    EnthalpyOfMixing Value (kJ / mol),EnthalpyOfMixing Uncertainty (kJ / mol),Source";

const ROWS: &[&str] = &[
    "298.15,101.325,Liquid,1,CCO,Solvent,1.0,,,,,,0.789,0.001,,,10.1016/a",
    "310.15,101.325,Liquid,1,CCO,Solvent,1.0,,,,,,0.780,0.002,,,10.1016/a",
    "298.15,101.325,Liquid,1,O,Solvent,1.0,,,,,,0.997,0.001,,,10.1016/b",
    "298.15,101.325,Liquid,2,CCO,Solvent,0.5,,O,Solvent,0.5,,0.9,0.01,-0.5,0.01,10.1016/c",
    "298.15,101.325,Liquid,1,FC(Cl)Br,Solvent,1.0,,,,,,1.9,,,,10.1016/d",
    "298.15,101.325,Liquid,1,[Na+].[Cl-],Solvent,1.0,,,,,,2.16,,,,10.1016/e",
    "298.15,101.325,Liquid,1,[NH4+],Solvent,1.0,,,,,,1.0,,,,10.1016/f",
    "298.15,101.325,Liquid,1,CCl,Solvent,1.0,,,,,,0.91,,,,10.1016/g",
    "350.0,101.325,Liquid,1,CCO,Solvent,1.0,,,,,,0.75,,,,10.1016/h",
    "298.15,500.0,Liquid,1,CCO,Solvent,1.0,,,,,,0.8,,,,10.1016/i",
];

const ANNOTATIONS: &str = r#"{
    "CCO": {"elements": ["C", "H", "O"], "environments": {"Alcohol": 1, "PrimaryAlcohol": 1}},
    "O": {"elements": ["H", "O"]},
    "FC(Cl)Br": {"elements": ["Br", "C", "Cl", "F", "H"], "undefined_stereochemistry": true},
    "[NH4+]": {"elements": ["H", "N"], "formal_charge": 1},
    "CCl": {"elements": ["C", "Cl", "H"], "environments": {"HalogenDeriv": 1}}
}"#;

const WORKFLOW: &str = r#"{
    "component_schemas": [
        {"type": "FilterByTemperature", "minimum_temperature": 290.0, "maximum_temperature": 320.0},
        {"type": "FilterByPressure", "minimum_pressure": 100.0, "maximum_pressure": 110.0},
        {"type": "FilterByIonicLiquid"},
        {"type": "FilterByCharged"},
        {"type": "FilterByStereochemistry"},
        {"type": "FilterByElements", "allowed_elements": ["C", "H", "O"]},
        {"type": "FilterDuplicates"},
        {"type": "FilterByPropertyTypes", "property_types": ["Density"]},
        {"type": "FilterByNComponents", "n_components": [1]}
    ]
}"#;

fn load_table() -> MeasurementTable {
    let text = std::iter::once(HEADER)
        .chain(ROWS.iter().copied())
        .collect::<Vec<_>>()
        .join("\n");
    TableParser::new().parse_str(&text).expect("Failed to parse fixture")
}

fn toolkit() -> AnnotatedToolkit {
    AnnotatedToolkit::from_json(ANNOTATIONS).expect("Failed to parse annotations")
}

fn registry() -> StageRegistry {
    StageRegistry::with_toolkit(Arc::new(toolkit()))
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[test]
fn test_fixture_parses() {
    let table = load_table();

    assert_eq!(table.len(), 10);
    assert_eq!(table.max_n_components(), 2);
    assert_eq!(table.count_property("Density"), 10);
    assert_eq!(table.count_property("EnthalpyOfMixing"), 1);
}

#[test]
fn test_full_filter_workflow() {
    let table = load_table();
    let schema = WorkflowSchema::from_json(WORKFLOW).unwrap();
    let workflow = Workflow::new(&schema, &registry()).unwrap();

    let (curated, report) = workflow.apply_with_report(&table, 1).unwrap();

    let removed: Vec<(StageKind, usize)> = report
        .stages
        .iter()
        .map(|stage| (stage.kind, stage.rows_removed()))
        .collect();
    assert_eq!(
        removed,
        vec![
            (StageKind::FilterByTemperature, 1),
            (StageKind::FilterByPressure, 1),
            (StageKind::FilterByIonicLiquid, 1),
            (StageKind::FilterByCharged, 1),
            (StageKind::FilterByStereochemistry, 1),
            (StageKind::FilterByElements, 1),
            (StageKind::FilterDuplicates, 0),
            (StageKind::FilterByPropertyTypes, 0),
            (StageKind::FilterByNComponents, 1),
        ]
    );

    assert_eq!(curated.len(), 3);
    assert!(!curated.has_property("EnthalpyOfMixing"));
    let temperatures: Vec<f64> = curated.iter().map(|row| row.temperature).collect();
    assert_eq!(temperatures, vec![298.15, 310.15, 298.15]);
}

#[test]
fn test_parallel_run_matches_sequential() {
    let table = load_table();
    let schema = WorkflowSchema::from_json(WORKFLOW).unwrap();
    let workflow = Workflow::new(&schema, &registry()).unwrap();

    let sequential = workflow.apply(&table, 1).unwrap();
    let parallel = workflow.apply(&table, 4).unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_unknown_molecule_aborts_the_run() {
    // [Na+].[Cl-] is not annotated, so inspecting elements before the
    // ionic liquid filter has removed it fails.
    let schema = WorkflowSchema::from_json(
        r#"{"component_schemas": [{"type": "FilterByElements", "forbidden_elements": ["Br"]}]}"#,
    )
    .unwrap();

    let result = Workflow::apply_schema(&load_table(), &schema, &registry(), 1);
    assert!(matches!(result, Err(CurationError::Toolkit(_))));
}

// =============================================================================
// Individual Filter Tests
// =============================================================================

#[test]
fn test_forbidden_elements() {
    let table = load_table().retain(|row| !row.component_smiles().any(|s| s.contains('.')));
    let schema = FilterByElementsSchema::forbidden(["Cl", "N"]).unwrap();

    let filtered = filter_by_elements(&table, &schema, &toolkit(), 2).unwrap();

    // FC(Cl)Br, [NH4+] and CCl go.
    assert_eq!(filtered.len(), 6);
}

#[test]
fn test_environments_across_mixtures() {
    let table = load_table().retain(|row| row.temperature < 320.0 && row.pressure < 110.0);
    let toolkit = toolkit();

    let alcohols = FilterByEnvironmentsSchema::environments([ChemicalEnvironment::Alcohol]);
    let filtered = filter_by_environments(&table, &alcohols, &toolkit, 1).unwrap();
    assert_eq!(filtered.len(), 2);

    let with_water = FilterByEnvironmentsSchema::environments([
        ChemicalEnvironment::Alcohol,
        ChemicalEnvironment::Aqueous,
    ]);
    let filtered = filter_by_environments(&table, &with_water, &toolkit, 1).unwrap();
    assert_eq!(filtered.len(), 4);
    assert_eq!(filtered.max_n_components(), 2);
}

#[test]
fn test_property_types_with_component_counts() {
    let table = load_table();
    let schema = FilterByPropertyTypesSchema::new(["EnthalpyOfMixing"])
        .unwrap()
        .with_n_components("EnthalpyOfMixing", [2])
        .unwrap();

    let filtered = filter_by_property_types(&table, &schema);

    assert_eq!(filtered.len(), 1);
    assert_eq!(
        filtered.properties().keys().collect::<Vec<_>>(),
        vec!["EnthalpyOfMixing"]
    );
}

#[test]
fn test_substances_ignore_component_order() {
    let table = load_table();
    let schema = FilterBySubstancesSchema::include([Substance::new(["O", "CCO"])]);

    let filtered = filter_by_substances(&table, &schema);

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.rows()[0].n_components(), 2);
}
