use super::*;

use crate::{internal, Error};

//-----------------------------------------------------------------------------

fn counts(values: &[(&str, usize)]) -> BTreeMap<String, usize> {
    values.iter().map(|(name, count)| (name.to_string(), *count)).collect()
}

fn classify(values: &[(&str, usize)], taxonomy: &TaxonomyTable) -> ReadPurity {
    let result = ReadPurity::classify(&counts(values), taxonomy);
    assert!(result.is_ok(), "Failed to classify {:?}: {}", values, result.unwrap_err());
    let result = result.unwrap();
    assert!(result.is_some(), "No classification for {:?}", values);
    result.unwrap()
}

//-----------------------------------------------------------------------------

#[test]
fn pure_contig() {
    // No taxonomy needed for a pure contig.
    let taxonomy = TaxonomyTable::new();
    let purity = classify(&[("G9", 12)], &taxonomy);
    assert_eq!(purity.dominant_reference, "G9", "Wrong dominant reference");
    assert_eq!(purity.dominant_count, 12, "Wrong dominant count");
    assert_eq!(purity.total_count, 12, "Wrong total count");
    assert_eq!(purity.purity, 1.0, "Wrong purity");
    assert_eq!(purity.lca, Some(Rank::Strain), "A pure contig should have the finest LCA");
    assert_eq!(purity.rank_counts, [12; Rank::COUNT], "All ranks should have the total count");
}

#[test]
fn empty_distribution() {
    let taxonomy = internal::example_taxonomy();
    let result = ReadPurity::classify(&BTreeMap::new(), &taxonomy);
    assert!(matches!(result, Ok(None)), "Classified an empty distribution");
    let result = ReadPurity::classify(&counts(&[("G1", 0)]), &taxonomy);
    assert!(matches!(result, Ok(None)), "Classified a distribution with zero counts");
}

#[test]
fn same_genus() {
    let taxonomy = internal::example_taxonomy();
    let purity = classify(&[("G1", 6), ("G2", 2)], &taxonomy);
    assert_eq!(purity.dominant_reference, "G1", "Wrong dominant reference");
    assert_eq!(purity.purity, 0.75, "Wrong purity");
    assert_eq!(purity.lca, Some(Rank::Genus), "Wrong LCA for strains in the same genus");
    assert_eq!(purity.rank_counts[Rank::Strain.index()], 6, "Wrong strain count");
    assert_eq!(purity.rank_counts[Rank::Species.index()], 6, "Wrong species count");
    for rank in Rank::ALL.iter().filter(|rank| **rank >= Rank::Genus) {
        assert_eq!(purity.rank_counts[rank.index()], 8, "Wrong count at {}", rank);
    }
}

#[test]
fn coarser_lca() {
    let taxonomy = internal::example_taxonomy();

    // G1 and G3 share the family.
    let purity = classify(&[("G1", 1), ("G3", 3)], &taxonomy);
    assert_eq!(purity.dominant_reference, "G3", "Wrong dominant reference");
    assert_eq!(purity.lca, Some(Rank::Family), "Wrong LCA for genera in the same family");
    assert_eq!(purity.rank_counts[Rank::Genus.index()], 3, "Wrong genus count");

    // G4 is archaeal, so only life is shared.
    let purity = classify(&[("G1", 5), ("G2", 3), ("G4", 2)], &taxonomy);
    assert_eq!(purity.lca, Some(Rank::Life), "Wrong LCA across superkingdoms");
    assert_eq!(purity.rank_counts[Rank::Genus.index()], 8, "Wrong genus count");
    assert_eq!(purity.rank_counts[Rank::Superkingdom.index()], 8, "Wrong superkingdom count");
    assert_eq!(purity.rank_counts[Rank::Life.index()], 10, "Wrong life count");
}

#[test]
fn unresolved_lca() {
    let mut taxonomy = TaxonomyTable::new();
    taxonomy.insert("A", internal::lineage(["a", "a", "a", "a", "a", "a", "a", "a", "a", "a"]));
    taxonomy.insert("B", internal::lineage(["b", "b", "b", "b", "b", "b", "b", "b", "b", "b"]));
    let purity = classify(&[("A", 2), ("B", 1)], &taxonomy);
    assert_eq!(purity.lca, None, "Found an LCA for unrelated references");
    assert_eq!(purity.rank_counts, [2; Rank::COUNT], "Wrong counts without an LCA");
}

#[test]
fn lca_is_never_finer_than_shared_rank() {
    let taxonomy = internal::example_taxonomy();
    for (g1, g2) in [(1, 1), (1, 9), (9, 1), (5, 5), (100, 1)] {
        let purity = classify(&[("G1", g1), ("G2", g2)], &taxonomy);
        let lca = purity.lca;
        assert!(lca.is_some_and(|rank| rank >= Rank::Genus), "LCA {:?} finer than genus for counts {}/{}", lca, g1, g2);
    }
}

#[test]
fn dominant_tie_break() {
    let taxonomy = internal::example_taxonomy();
    let purity = classify(&[("G2", 4), ("G1", 4)], &taxonomy);
    assert_eq!(purity.dominant_reference, "G1", "Ties should go to the smallest name");
    assert_eq!(purity.purity, 0.5, "Wrong purity for a tie");
}

#[test]
fn missing_taxonomy() {
    let taxonomy = internal::example_taxonomy();
    let result = ReadPurity::classify(&counts(&[("G1", 3), ("G7", 1)]), &taxonomy);
    match result {
        Err(Error::MissingTaxonomy(name)) => assert_eq!(name, "G7", "Wrong reference in the error"),
        Err(err) => panic!("Wrong error for a missing reference: {}", err),
        Ok(purity) => panic!("Classified a distribution with a missing reference: {:?}", purity),
    }
}

//-----------------------------------------------------------------------------

#[test]
fn classify_example_contigs() {
    let taxonomy = internal::example_taxonomy();
    let c1 = ContigReads {
        unambiguous: counts(&[("G1", 8)]),
        ambiguous: counts(&[("G1", 8), ("G2", 2)]),
    };
    let c2 = ContigReads {
        unambiguous: BTreeMap::new(),
        ambiguous: counts(&[("G3", 1), ("G9", 1)]),
    };

    let contigs = vec![("C1", &c1), ("C2", &c2)];
    let classifications = classify_contigs(contigs, &taxonomy);
    assert_eq!(classifications.len(), 2, "Wrong number of contigs");

    let c1 = &classifications["C1"];
    assert_eq!(c1.get(Distribution::Unambiguous).map(|x| x.lca), Some(Some(Rank::Strain)), "Wrong unambiguous LCA for C1");
    assert_eq!(c1.get(Distribution::Ambiguous).map(|x| x.lca), Some(Some(Rank::Genus)), "Wrong ambiguous LCA for C1");

    let c2 = &classifications["C2"];
    assert!(c2.unambiguous.is_none(), "C2 has no unambiguous reads");
    assert!(c2.ambiguous.is_none(), "A classification failure should leave the distribution empty");
}

#[test]
fn chimeric_lca_counts() {
    let taxonomy = internal::example_taxonomy();
    let mut classifications = BTreeMap::new();
    let cases: [(&str, &[(&str, usize)]); 4] = [
        ("C1", &[("G1", 99), ("G2", 1)]), // Purity 0.99.
        ("C2", &[("G1", 6), ("G2", 4)]),
        ("C3", &[("G1", 6), ("G3", 4)]),
        ("C4", &[("G1", 1), ("G2", 1)]),
    ];
    for (contig, values) in cases {
        let classification = ContigClassification {
            unambiguous: None,
            ambiguous: Some(classify(values, &taxonomy)),
        };
        classifications.insert(contig.to_string(), classification);
    }

    let lca = ChimericLca::new(&classifications, 0.95);
    assert_eq!(lca.total(), 3, "Wrong number of chimeric contigs");
    assert_eq!(lca.by_rank[Rank::Genus.index()], 2, "Wrong number of contigs with genus LCA");
    assert_eq!(lca.by_rank[Rank::Family.index()], 1, "Wrong number of contigs with family LCA");
    assert_eq!(lca.unresolved, 0, "Wrong number of unresolved contigs");
}

//-----------------------------------------------------------------------------
