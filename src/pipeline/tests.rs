use super::*;

use crate::{internal, Rank};

use simple_sds::serialize;

//-----------------------------------------------------------------------------

fn example_config(output_dir: &Path) -> ValidationConfig {
    let mut config = ValidationConfig::new(
        utils::get_test_data("example.coords"),
        utils::get_test_data("ref.stats"),
        utils::get_test_data("contigs.fa"),
        output_dir.to_path_buf(),
    );
    config.cache = CacheMode::Memory;
    config
}

fn read_lines(filename: &Path) -> Vec<String> {
    let text = fs::read_to_string(filename);
    assert!(text.is_ok(), "Failed to read {}: {}", filename.display(), text.unwrap_err());
    text.unwrap().lines().map(String::from).collect()
}

//-----------------------------------------------------------------------------

#[test]
fn default_config() {
    let config = ValidationConfig::new("data/asm.coords", "ref.stats", "contigs.fa", "out");
    assert_eq!(config.min_length, 100, "Wrong default minimum length");
    assert_eq!(config.chimeric_threshold, 0.95, "Wrong default chimeric threshold");
    assert!(config.reads.is_none(), "Read inputs by default");
    assert_eq!(config.cache_file(), Some(PathBuf::from("data/asm.coords.sqlite")), "Wrong default cache file");

    let mut config = config;
    config.cache = CacheMode::File(PathBuf::from("cache.db"));
    assert_eq!(config.cache_file(), Some(PathBuf::from("cache.db")), "Wrong explicit cache file");
    config.cache = CacheMode::Memory;
    assert_eq!(config.cache_file(), None, "Cache file for an in-memory store");
}

#[test]
fn config_with_mixed_path_types() {
    let config = ValidationConfig::new(
        PathBuf::from("asm.coords"), "ref.stats", Path::new("contigs.fa"), String::from("out")
    );
    assert_eq!(config.coords, PathBuf::from("asm.coords"), "Wrong coords file");
    assert_eq!(config.reference_stats, PathBuf::from("ref.stats"), "Wrong reference-stats file");
    assert_eq!(config.contigs, PathBuf::from("contigs.fa"), "Wrong contigs file");
    assert_eq!(config.output_dir, PathBuf::from("out"), "Wrong output directory");
}

#[test]
fn example_results() {
    let config = example_config(Path::new("unused"));
    let result = ValidationResults::compute(&config);
    assert!(result.is_ok(), "Failed to compute the statistics: {}", result.unwrap_err());
    let results = result.unwrap();

    assert_eq!(results.assembly.len(), 4, "Wrong number of contigs");
    assert_eq!(results.genome_coverage.len(), 3, "Coverage should include every reference genome");
    assert_eq!(results.genome_coverage["G1"], 516, "Wrong coverage for G1");
    assert_eq!(results.max_purity.len(), 4, "Wrong number of contigs with max purity");
    assert_eq!(results.ratios.sum_aligned_bases(), 866, "Wrong sum of aligned bases");
    assert_eq!(results.ratios.total_assembly_bases(), 870, "Wrong assembly length");
    assert!(results.classifications.is_none(), "Read-level purity without read inputs");
}

#[test]
fn missing_input_is_fatal() {
    let mut config = example_config(Path::new("unused"));
    config.reference_stats = utils::get_test_data("no-such.stats");
    assert!(ValidationResults::compute(&config).is_err(), "Computed statistics without reference stats");

    let mut config = example_config(Path::new("unused"));
    config.min_length = 1000;
    assert!(ValidationResults::compute(&config).is_err(), "Computed statistics for an empty assembly");
}

#[test]
fn run_writes_tables() {
    let output_dir = serialize::temp_file_name("asm-validate");
    let config = example_config(&output_dir);
    let result = run(&config);
    assert!(result.is_ok(), "Failed to run the validation: {}", result.unwrap_err());

    let asm_stats = read_lines(&output_dir.join(report::ASM_STATS));
    assert_eq!(asm_stats.len(), 2, "Wrong number of lines in {}", report::ASM_STATS);
    let coverage = read_lines(&output_dir.join(report::GENOME_CONTIG_COVERAGE));
    assert_eq!(coverage.len(), 5, "Wrong number of lines in {}", report::GENOME_CONTIG_COVERAGE);
    let purity = read_lines(&output_dir.join(report::CONTIG_PURITY));
    assert_eq!(purity.len(), 5, "Wrong number of lines in {}", report::CONTIG_PURITY);
    assert!(!utils::file_exists(output_dir.join(report::CHIMERIC_LCA)), "Chimeric LCA table without read inputs");

    let _ = fs::remove_dir_all(&output_dir);
}

#[test]
fn cache_reuse_and_rebuild() {
    let cache_file = serialize::temp_file_name("asm-validate-cache");
    let mut config = example_config(Path::new("unused"));
    config.cache = CacheMode::File(cache_file.clone());

    let store = config.load_store();
    assert!(store.is_ok(), "Failed to create the cache: {}", store.unwrap_err());
    assert_eq!(store.unwrap().records(), 8, "Wrong number of records in a new cache");
    assert!(utils::file_exists(&cache_file), "The cache was not created");

    let store = config.load_store();
    assert!(store.is_ok(), "Failed to reuse the cache: {}", store.unwrap_err());
    assert_eq!(store.unwrap().records(), 8, "Wrong number of records in a reused cache");

    config.rebuild_cache = true;
    let store = config.load_store();
    assert!(store.is_ok(), "Failed to rebuild the cache: {}", store.unwrap_err());
    assert_eq!(store.unwrap().records(), 8, "Wrong number of records in a rebuilt cache");

    let _ = fs::remove_file(&cache_file);
}

//-----------------------------------------------------------------------------

#[test]
fn example_read_level_purity() {
    let assembly = AssemblyStats::from_file(utils::get_test_data("contigs.fa"), 100).unwrap();
    let taxonomy = internal::example_taxonomy();
    let reference_mappings = vec![
        internal::mapping("r1", "G1", 60, 150),
        internal::mapping("r2", "G1", 60, 150),
        internal::mapping("r3", "G2", 60, 150),
        internal::mapping("r4", "G3", 60, 150),
        internal::mapping("r4", "G4", 60, 150),
    ];
    let contig_mappings = vec![
        internal::mapping("r1", "C1", 60, 150),
        internal::mapping("r2", "C1", 60, 150),
        internal::mapping("r3", "C1", 60, 150),
        internal::mapping("r4", "C2", 60, 150),
        internal::mapping("r1", "C4", 60, 150), // Short contig.
    ];
    let result = read_level_purity(reference_mappings, contig_mappings, &taxonomy, &assembly, 100);
    assert!(result.is_ok(), "Failed to compute read-level purity: {}", result.unwrap_err());
    let classifications = result.unwrap();

    assert_eq!(classifications.len(), 2, "Wrong number of classified contigs");
    assert!(!classifications.contains_key("C4"), "Classified a contig below the cutoff");

    let c1 = classifications["C1"].unambiguous.as_ref().unwrap();
    assert_eq!(c1.dominant_reference, "G1", "Wrong dominant reference for C1");
    assert_eq!((c1.dominant_count, c1.total_count), (2, 3), "Wrong counts for C1");
    assert_eq!(c1.lca, Some(Rank::Genus), "Wrong LCA for C1");

    let c2 = &classifications["C2"];
    assert!(c2.unambiguous.is_none(), "C2 only has an ambiguous read");
    let c2 = c2.ambiguous.as_ref().unwrap();
    assert_eq!(c2.purity, 0.5, "Wrong ambiguous purity for C2");
    assert_eq!(c2.lca, Some(Rank::Life), "Wrong ambiguous LCA for C2");

    let chimeric = ChimericLca::new(&classifications, 0.95);
    assert_eq!(chimeric.total(), 2, "Wrong number of chimeric contigs");
    assert_eq!(chimeric.by_rank[Rank::Life.index()], 1, "Wrong number of contigs with LCA life");
}

//-----------------------------------------------------------------------------
