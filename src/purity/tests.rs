use super::*;

use crate::{coverage, internal, ContigStats, MaxPurity};

//-----------------------------------------------------------------------------

fn assert_close(value: Result<f64>, truth: f64, name: &str) {
    assert!(value.is_ok(), "Failed to compute {}: {}", name, value.unwrap_err());
    let value = value.unwrap();
    assert!((value - truth).abs() < 1e-9, "Wrong {}: {} (expected {})", name, value, truth);
}

fn assert_division_by_zero(value: Result<f64>, name: &str) {
    match value {
        Err(Error::DivisionByZero { ratio }) => assert_eq!(ratio, name, "Wrong ratio in the error"),
        Err(err) => panic!("Wrong error for {}: {}", name, err),
        Ok(value) => panic!("Computed {} = {} with a zero denominator", name, value),
    }
}

//-----------------------------------------------------------------------------

#[test]
fn example_ratios() {
    let store = internal::example_store();
    let max_purity = coverage::contig_max_purity(&store, 100).unwrap();
    let aligned = coverage::contig_aligned_bases(&store, 100).unwrap();
    let ratios = PurityRatios::new(&max_purity, &aligned, 870, 2300);

    let purest = 0.6667 * 300.0 + 0.98 * 250.0 + 120.0 + 0.7125 * 200.0;
    assert!((ratios.sum_purest_bases() - purest).abs() < 1e-9, "Wrong sum of purest bases: {}", ratios.sum_purest_bases());
    assert_eq!(ratios.sum_aligned_bases(), 866, "Wrong sum of aligned bases");
    assert_close(ratios.alignment_purity(), purest / 866.0, "alignment purity");
    assert_close(ratios.global_purity(), purest / 870.0, "global purity");
    assert_close(ratios.alignment_ratio(), 866.0 / 870.0, "alignment ratio");
    assert_close(ratios.metagenome_coverage(), purest / 2300.0, "metagenome coverage");
}

#[test]
fn zero_denominators() {
    let ratios = PurityRatios::new(&ContigMaxPurity::new(), &ContigAlignedBases::new(), 0, 0);
    assert_eq!(ratios.sum_purest_bases(), 0.0);
    assert!(ratios.sum_purest_bases().is_sign_positive(), "The empty sum should be positive zero");
    assert_division_by_zero(ratios.alignment_purity(), "alignment purity");
    assert_division_by_zero(ratios.global_purity(), "global purity");
    assert_division_by_zero(ratios.alignment_ratio(), "alignment ratio");
    assert_division_by_zero(ratios.metagenome_coverage(), "metagenome coverage");
}

#[test]
fn partial_zero_denominators() {
    let mut max_purity = ContigMaxPurity::new();
    max_purity.insert(String::from("C1"), MaxPurity { max_purity: 1.0, length: 100 });
    let mut aligned = ContigAlignedBases::new();
    aligned.insert(String::from("C1"), 99);

    // An empty reference set only affects metagenome coverage.
    let ratios = PurityRatios::new(&max_purity, &aligned, 100, 0);
    assert_close(ratios.alignment_purity(), 100.0 / 99.0, "alignment purity");
    assert_close(ratios.global_purity(), 1.0, "global purity");
    assert_close(ratios.alignment_ratio(), 0.99, "alignment ratio");
    assert_division_by_zero(ratios.metagenome_coverage(), "metagenome coverage");
}

#[test]
fn ratios_for_assembly() {
    let mut max_purity = ContigMaxPurity::new();
    max_purity.insert(String::from("C1"), MaxPurity { max_purity: 1.0, length: 200 });
    max_purity.insert(String::from("Ns"), MaxPurity { max_purity: 0.5, length: 400 });
    let mut aligned = ContigAlignedBases::new();
    aligned.insert(String::from("C1"), 150);
    aligned.insert(String::from("Ns"), 300);

    // Contig Ns has too few nucleotides to pass the cutoff.
    let assembly = AssemblyStats::new(vec![
        ContigStats { name: String::from("C1"), length: 200, gc_content: 0.5 },
        ContigStats { name: String::from("Ns"), length: 50, gc_content: 0.5 },
    ], 100).unwrap();

    let ratios = PurityRatios::for_assembly(&max_purity, &aligned, &assembly, 1000);
    assert_eq!(ratios.sum_purest_bases(), 200.0, "Contigs outside the assembly should not count");
    assert_eq!(ratios.sum_aligned_bases(), 150, "Wrong sum of aligned bases");
    assert_eq!(ratios.total_assembly_bases(), 200, "Wrong assembly length");
    assert_close(ratios.global_purity(), 1.0, "global purity");
}

//-----------------------------------------------------------------------------
