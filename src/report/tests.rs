use super::*;

use crate::{classify, coverage, internal, ContigReads, ContigStats};

//-----------------------------------------------------------------------------

fn lines(output: Vec<u8>) -> Vec<Vec<String>> {
    let text = String::from_utf8(output);
    assert!(text.is_ok(), "Output is not valid UTF-8");
    text.unwrap().lines().map(|line| line.split('\t').map(String::from).collect()).collect()
}

fn example_assembly() -> AssemblyStats {
    let filename = utils::get_test_data("contigs.fa");
    let result = AssemblyStats::from_file(&filename, 100);
    assert!(result.is_ok(), "Failed to read {}: {}", filename.display(), result.unwrap_err());
    result.unwrap()
}

fn example_references() -> ReferenceStats {
    let filename = utils::get_test_data("ref.stats");
    let result = ReferenceStats::read(&filename);
    assert!(result.is_ok(), "Failed to read {}: {}", filename.display(), result.unwrap_err());
    result.unwrap()
}

//-----------------------------------------------------------------------------

#[test]
fn asm_stats_table() {
    let store = internal::example_store();
    let stats = example_assembly();
    let references = example_references();
    let max_purity = coverage::contig_max_purity(&store, 100).unwrap();
    let aligned = coverage::contig_aligned_bases(&store, 100).unwrap();
    let ratios = PurityRatios::new(&max_purity, &aligned, stats.total_bases, references.total_length());

    let mut output = Vec::new();
    let result = write_asm_stats(&mut output, &stats, &ratios);
    assert!(result.is_ok(), "Failed to write assembly statistics: {}", result.unwrap_err());
    let lines = lines(output);
    assert_eq!(lines.len(), 2, "Wrong number of lines");
    assert_eq!(lines[0].len(), lines[1].len(), "The header and the row have different widths");
    assert_eq!(lines[0][0], "min_length", "Wrong first column");

    let row = &lines[1];
    assert_eq!(&row[0..6], &["100", "4", "870", "300", "250", "1"], "Wrong assembly statistics");
    assert_eq!(row[6], "707.510000", "Wrong sum of purest bases");
    assert_eq!(row[7], "866", "Wrong sum of aligned bases");
    assert_eq!(row[8], "2300", "Wrong total reference length");
    assert_eq!(row[11], format!("{:.6}", 866.0 / 870.0), "Wrong alignment ratio");
}

#[test]
fn asm_stats_without_references() {
    let stats = AssemblyStats::new(vec![ContigStats { name: String::from("C1"), length: 100, gc_content: 0.5 }], 0).unwrap();
    let ratios = PurityRatios::new(&ContigMaxPurity::new(), &ContigAlignedBases::new(), stats.total_bases, 0);
    let mut output = Vec::new();
    write_asm_stats(&mut output, &stats, &ratios).unwrap();
    let lines = lines(output);
    assert_eq!(lines[1][9], "-", "Alignment purity without aligned bases");
    assert_eq!(lines[1][10], "0.000000", "Wrong global purity");
    assert_eq!(lines[1][12], "-", "Metagenome coverage without references");
}

//-----------------------------------------------------------------------------

#[test]
fn genome_coverage_table() {
    let store = internal::example_store();
    let references = example_references();
    let genome_coverage = coverage::genome_contig_coverage(&store, 100, &references.lengths()).unwrap();

    let mut output = Vec::new();
    let result = write_genome_coverage(&mut output, &genome_coverage, &references);
    assert!(result.is_ok(), "Failed to write genome coverage: {}", result.unwrap_err());
    let lines = lines(output);
    assert_eq!(lines.len(), 5, "Wrong number of lines");

    assert_eq!(lines[1], vec!["G1", "516", "1000", "0.516000", "0.500000", "0.520000"], "Wrong row for G1");
    assert_eq!(lines[2], vec!["G2", "262", "800", "0.327500", "0.400000", "0.330000"], "Wrong row for G2");
    assert_eq!(lines[3], vec!["G3", "0", "500", "0.000000", "0.600000", "0.000000"], "Wrong row for G3");
    assert_eq!(lines[4], vec!["Total", "778", "2300", "0.338261", "-", "-"], "Wrong total row");
}

//-----------------------------------------------------------------------------

#[test]
fn contig_purity_table_without_reads() {
    let store = internal::example_store();
    let stats = example_assembly();
    let max_purity = coverage::contig_max_purity(&store, 100).unwrap();
    let aligned = coverage::contig_aligned_bases(&store, 100).unwrap();

    let mut output = Vec::new();
    let result = write_contig_purity(&mut output, &stats, &max_purity, &aligned, None);
    assert!(result.is_ok(), "Failed to write contig purity: {}", result.unwrap_err());
    let lines = lines(output);
    let width = 5 + 2 * (5 + Rank::COUNT);
    assert_eq!(lines.len(), 5, "Wrong number of lines");
    assert!(lines.iter().all(|line| line.len() == width), "Wrong number of columns");
    assert_eq!(lines[0][5], "unambiguous_read_purity", "Wrong read-level header");
    assert_eq!(lines[0][width - 1], "ambiguous_life_reads", "Wrong last column");

    let contigs: Vec<&str> = lines[1..].iter().map(|line| line[0].as_str()).collect();
    assert_eq!(contigs, vec!["C1", "C2", "C5", "C3"], "Contigs should be in descending order by length");
    assert_eq!(&lines[2][0..5], &["C2", "250", "0.5920", "0.980000", "249"], "Wrong alignment fields for C2");
    assert!(lines[1][5..].iter().all(|field| field == "-"), "Read-level fields without reads");
}

#[test]
fn contig_purity_table_with_reads() {
    let stats = AssemblyStats::new(vec![
        ContigStats { name: String::from("C1"), length: 200, gc_content: 0.25 },
        ContigStats { name: String::from("C2"), length: 150, gc_content: 0.5 },
    ], 100).unwrap();
    let taxonomy = internal::example_taxonomy();
    let reads = ContigReads {
        unambiguous: BTreeMap::from([(String::from("G1"), 3)]),
        ambiguous: BTreeMap::from([(String::from("G1"), 3), (String::from("G2"), 1)]),
    };
    let classifications = classify::classify_contigs(vec![("C1", &reads)], &taxonomy);

    let mut output = Vec::new();
    write_contig_purity(&mut output, &stats, &ContigMaxPurity::new(), &ContigAlignedBases::new(), Some(&classifications)).unwrap();
    let lines = lines(output);

    let c1 = &lines[1];
    assert_eq!(&c1[0..5], &["C1", "200", "0.2500", "-", "0"], "Wrong alignment fields without alignments");
    assert_eq!(&c1[5..10], &["1.000000", "G1", "3", "3", "strain"], "Wrong unambiguous fields");
    assert_eq!(&c1[20..25], &["0.750000", "G1", "3", "4", "genus"], "Wrong ambiguous fields");
    assert_eq!(&c1[25..28], &["3", "3", "4"], "Wrong ambiguous rank counts");

    let c2 = &lines[2];
    assert!(c2[5..].iter().all(|field| field == "-"), "Read-level fields for a contig without reads");
}

//-----------------------------------------------------------------------------

#[test]
fn chimeric_lca_table() {
    let mut lca = ChimericLca::default();
    lca.by_rank[Rank::Genus.index()] = 2;
    lca.unresolved = 1;

    let mut output = Vec::new();
    write_chimeric_lca(&mut output, &lca).unwrap();
    let lines = lines(output);
    assert_eq!(lines.len(), 2 + Rank::COUNT, "Wrong number of lines");
    assert_eq!(lines[0], vec!["lca", "contigs"], "Wrong header");
    assert_eq!(lines[1], vec!["strain", "0"], "Wrong row for strain");
    assert_eq!(lines[3], vec!["genus", "2"], "Wrong row for genus");
    assert_eq!(lines[Rank::COUNT + 1], vec!["unresolved", "1"], "Wrong row for unresolved contigs");
}

//-----------------------------------------------------------------------------
