//! Chemical environment catalogue.
//!
//! Environments follow the functional-group numbering of the `checkmol`
//! program, plus an `Aqueous` category for water.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ToolkitError;

/// Functional groups found in a molecule and how often each occurs.
pub type FunctionalGroups = BTreeMap<ChemicalEnvironment, u32>;

macro_rules! chemical_environments {
    ($($name:ident => $code:literal,)*) => {
        /// A functional-group category a molecule can be classified into.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ChemicalEnvironment {
            $($name,)*
            Aqueous,
        }

        impl ChemicalEnvironment {
            /// Every environment, in catalogue order.
            pub const ALL: &'static [ChemicalEnvironment] = &[
                $(ChemicalEnvironment::$name,)*
                ChemicalEnvironment::Aqueous,
            ];

            /// The `checkmol` group code, if the environment has one.
            pub fn checkmol_code(&self) -> Option<&'static str> {
                match self {
                    $(ChemicalEnvironment::$name => Some($code),)*
                    ChemicalEnvironment::Aqueous => None,
                }
            }

            /// Look up an environment by its `checkmol` group code.
            pub fn from_checkmol_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some(ChemicalEnvironment::$name),)*
                    _ => None,
                }
            }

            /// The environment name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ChemicalEnvironment::$name => stringify!($name),)*
                    ChemicalEnvironment::Aqueous => "Aqueous",
                }
            }
        }
    };
}

chemical_environments! {
    Alkane => "000",
    Cation => "001",
    Anion => "002",
    Carbonyl => "003",
    Aldehyde => "004",
    Ketone => "005",
    Thiocarbonyl => "006",
    Thioaldehyde => "007",
    Thioketone => "008",
    Imine => "009",
    Hydrazone => "010",
    Semicarbazone => "011",
    Thiosemicarbazone => "012",
    Oxime => "013",
    OximeEther => "014",
    Ketene => "015",
    KeteneAcetalDeriv => "016",
    CarbonylHydrate => "017",
    Hemiacetal => "018",
    Acetal => "019",
    Hemiaminal => "020",
    Aminal => "021",
    Thiohemiaminal => "022",
    Thioacetal => "023",
    Enamine => "024",
    Enol => "025",
    Enolether => "026",
    Hydroxy => "027",
    Alcohol => "028",
    PrimaryAlcohol => "029",
    SecondaryAlcohol => "030",
    TertiaryAlcohol => "031",
    Diol12 => "032",
    Aminoalcohol12 => "033",
    Phenol => "034",
    Diphenol12 => "035",
    Enediol => "036",
    Ether => "037",
    Dialkylether => "038",
    Alkylarylether => "039",
    Diarylether => "040",
    Thioether => "041",
    Disulfide => "042",
    Peroxide => "043",
    Hydroperoxide => "044",
    Hydrazine => "045",
    Hydroxylamine => "046",
    Amine => "047",
    PrimaryAmine => "048",
    PrimaryAliphAmine => "049",
    PrimaryAromAmine => "050",
    SecondaryAmine => "051",
    SecondaryAliphAmine => "052",
    SecondaryMixedAmine => "053",
    SecondaryAromAmine => "054",
    TertiaryAmine => "055",
    TertiaryAliphAmine => "056",
    TertiaryMixedAmine => "057",
    TertiaryAromAmine => "058",
    QuartAmmonium => "059",
    NOxide => "060",
    HalogenDeriv => "061",
    AlkylHalide => "062",
    AlkylFluoride => "063",
    AlkylChloride => "064",
    AlkylBromide => "065",
    AlkylIodide => "066",
    ArylHalide => "067",
    ArylFluoride => "068",
    ArylChloride => "069",
    ArylBromide => "070",
    ArylIodide => "071",
    Organometallic => "072",
    Organolithium => "073",
    Organomagnesium => "074",
    CarboxylicAcidDeriv => "075",
    CarboxylicAcid => "076",
    CarboxylicAcidSalt => "077",
    CarboxylicAcidEster => "078",
    Lactone => "079",
    CarboxylicAcidAmide => "080",
    CarboxylicAcidPrimaryAmide => "081",
    CarboxylicAcidSecondaryAmide => "082",
    CarboxylicAcidTertiaryAmide => "083",
    Lactam => "084",
    CarboxylicAcidHydrazide => "085",
    CarboxylicAcidAzide => "086",
    HydroxamicAcid => "087",
    CarboxylicAcidAmidine => "088",
    CarboxylicAcidAmidrazone => "089",
    Nitrile => "090",
    AcylHalide => "091",
    AcylFluoride => "092",
    AcylChloride => "093",
    AcylBromide => "094",
    AcylIodide => "095",
    AcylCyanide => "096",
    ImidoEster => "097",
    ImidoylHalide => "098",
    ThiocarboxylicAcidDeriv => "099",
    ThiocarboxylicAcid => "100",
    ThiocarboxylicAcidEster => "101",
    Thiolactone => "102",
    ThiocarboxylicAcidAmide => "103",
    Thiolactam => "104",
    ImidoThioester => "105",
    Oxohetarene => "106",
    Thioxohetarene => "107",
    Iminohetarene => "108",
    OrthocarboxylicAcidDeriv => "109",
    CarboxylicAcidOrthoester => "110",
    CarboxylicAcidAmideAcetal => "111",
    CarboxylicAcidAnhydride => "112",
    CarboxylicAcidImide => "113",
    CarboxylicAcidUnsubstImide => "114",
    CarboxylicAcidSubstImide => "115",
    Co2Deriv => "116",
    CarbonicAcidDeriv => "117",
    CarbonicAcidMonoester => "118",
    CarbonicAcidDiester => "119",
    CarbonicAcidEsterHalide => "120",
    ThiocarbonicAcidDeriv => "121",
    ThiocarbonicAcidMonoester => "122",
    ThiocarbonicAcidDiester => "123",
    ThiocarbonicAcidEsterHalide => "124",
    CarbamicAcidDeriv => "125",
    CarbamicAcid => "126",
    CarbamicAcidEster => "127",
    CarbamicAcidHalide => "128",
    ThiocarbamicAcidDeriv => "129",
    ThiocarbamicAcid => "130",
    ThiocarbamicAcidEster => "131",
    ThiocarbamicAcidHalide => "132",
    Urea => "133",
    Isourea => "134",
    Thiourea => "135",
    Isothiourea => "136",
    Guanidine => "137",
    Semicarbazide => "138",
    Thiosemicarbazide => "139",
    Azide => "140",
    AzoCompound => "141",
    DiazoniumSalt => "142",
    Isonitrile => "143",
    Cyanate => "144",
    Isocyanate => "145",
    Thiocyanate => "146",
    Isothiocyanate => "147",
    Carbodiimide => "148",
    NitrosoCompound => "149",
    NitroCompound => "150",
    Nitrite => "151",
    Nitrate => "152",
    SulfuricAcidDeriv => "153",
    SulfuricAcid => "154",
    SulfuricAcidMonoester => "155",
    SulfuricAcidDiester => "156",
    SulfuricAcidAmideEster => "157",
    SulfuricAcidAmide => "158",
    SulfuricAcidDiamide => "159",
    SulfurylHalide => "160",
    SulfonicAcidDeriv => "161",
    SulfonicAcid => "162",
    SulfonicAcidEster => "163",
    Sulfonamide => "164",
    SulfonylHalide => "165",
    Sulfone => "166",
    Sulfoxide => "167",
    SulfinicAcidDeriv => "168",
    SulfinicAcid => "169",
    SulfinicAcidEster => "170",
    SulfinicAcidHalide => "171",
    SulfinicAcidAmide => "172",
    SulfenicAcidDeriv => "173",
    SulfenicAcid => "174",
    SulfenicAcidEster => "175",
    SulfenicAcidHalide => "176",
    SulfenicAcidAmide => "177",
    Thiol => "178",
    Alkylthiol => "179",
    Arylthiol => "180",
    PhosphoricAcidDeriv => "181",
    PhosphoricAcid => "182",
    PhosphoricAcidEster => "183",
    PhosphoricAcidHalide => "184",
    PhosphoricAcidAmide => "185",
    ThiophosphoricAcidDeriv => "186",
    ThiophosphoricAcid => "187",
    ThiophosphoricAcidEster => "188",
    ThiophosphoricAcidHalide => "189",
    ThiophosphoricAcidAmide => "190",
    PhosphonicAcidDeriv => "191",
    PhosphonicAcid => "192",
    PhosphonicAcidEster => "193",
    Phosphine => "194",
    Phosphinoxide => "195",
    BoronicAcidDeriv => "196",
    BoronicAcid => "197",
    BoronicAcidEster => "198",
    Alkene => "199",
    Alkyne => "200",
    Aromatic => "201",
    Heterocycle => "202",
    AlphaAminoacid => "203",
    AlphaHydroxyacid => "204",
}

impl fmt::Display for ChemicalEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChemicalEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ChemicalEnvironment::ALL
            .iter()
            .copied()
            .find(|env| env.as_str().eq_ignore_ascii_case(s))
            .or_else(|| ChemicalEnvironment::from_checkmol_code(s))
            .ok_or_else(|| format!("Unknown chemical environment: {}", s))
    }
}

/// Built-in classifications for molecules `checkmol` handles poorly.
pub(crate) fn builtin_functional_groups(smiles: &str) -> Option<FunctionalGroups> {
    match smiles {
        "O" | "[H]O[H]" => Some(FunctionalGroups::from([(ChemicalEnvironment::Aqueous, 1)])),
        "N" => Some(FunctionalGroups::from([(ChemicalEnvironment::Amine, 1)])),
        _ => None,
    }
}

/// Parse the output of `checkmol -p`.
///
/// Each line has the form `#<code>:<count>:<atoms>`. Empty output means no
/// functional group was found, which `checkmol` uses for plain alkanes.
pub fn parse_checkmol_output(output: &str) -> Result<FunctionalGroups, ToolkitError> {
    let mut groups = FunctionalGroups::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let malformed = |reason: &str| ToolkitError::MalformedOutput {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let mut fields = line.split(':');
        let code = fields
            .next()
            .and_then(|f| f.strip_prefix('#'))
            .ok_or_else(|| malformed("missing '#<code>' field"))?;
        let count = fields
            .next()
            .ok_or_else(|| malformed("missing count field"))?
            .parse::<u32>()
            .map_err(|e| malformed(&e.to_string()))?;

        let environment = ChemicalEnvironment::from_checkmol_code(code)
            .ok_or_else(|| malformed("unknown group code"))?;

        groups.insert(environment, count);
    }

    if groups.is_empty() {
        groups.insert(ChemicalEnvironment::Alkane, 1);
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkmol_codes_round_trip() {
        for environment in ChemicalEnvironment::ALL {
            match environment.checkmol_code() {
                Some(code) => assert_eq!(
                    ChemicalEnvironment::from_checkmol_code(code),
                    Some(*environment)
                ),
                None => assert_eq!(*environment, ChemicalEnvironment::Aqueous),
            }
        }
        assert_eq!(ChemicalEnvironment::Aldehyde.checkmol_code(), Some("004"));
        assert_eq!(ChemicalEnvironment::AlphaHydroxyacid.checkmol_code(), Some("204"));
    }

    #[test]
    fn test_parse_by_name_or_code() {
        assert_eq!("Alcohol".parse::<ChemicalEnvironment>(), Ok(ChemicalEnvironment::Alcohol));
        assert_eq!("ketone".parse::<ChemicalEnvironment>(), Ok(ChemicalEnvironment::Ketone));
        assert_eq!("150".parse::<ChemicalEnvironment>(), Ok(ChemicalEnvironment::NitroCompound));
        assert!("Unobtainium".parse::<ChemicalEnvironment>().is_err());
    }

    #[test]
    fn test_parse_checkmol_output() {
        let output = "#004:1:4,5\n#005:1:2,3\n#003:2:2,3,4,5\n";
        let groups = parse_checkmol_output(output).unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&ChemicalEnvironment::Carbonyl], 2);
        assert_eq!(groups[&ChemicalEnvironment::Aldehyde], 1);
    }

    #[test]
    fn test_empty_checkmol_output_is_alkane() {
        let groups = parse_checkmol_output("").unwrap();
        assert_eq!(groups, FunctionalGroups::from([(ChemicalEnvironment::Alkane, 1)]));
    }

    #[test]
    fn test_malformed_checkmol_output() {
        assert!(parse_checkmol_output("004:1:2").is_err());
        assert!(parse_checkmol_output("#999:1:2").is_err());
        assert!(parse_checkmol_output("#004:x:2").is_err());
    }

    #[test]
    fn test_builtin_classifications() {
        assert_eq!(
            builtin_functional_groups("O"),
            Some(FunctionalGroups::from([(ChemicalEnvironment::Aqueous, 1)]))
        );
        assert_eq!(
            builtin_functional_groups("N"),
            Some(FunctionalGroups::from([(ChemicalEnvironment::Amine, 1)]))
        );
        assert_eq!(builtin_functional_groups("CCO"), None);
    }
}
