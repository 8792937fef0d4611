use super::CultureEntry;

pub(super) fn entries() -> Vec<CultureEntry> {
    vec![
        CultureEntry::new("bamileke", "Bamileke", "Medumba")
            .with_steps([
                "Knocking on the door (Tso Tso)",
                "Bride price negotiation",
                "Traditional ceremony (Nguon)",
                "Exchange of gifts",
            ])
            .with_traditions([
                "The groom's family brings palm wine, kola nuts, and traditional fabrics",
                "Bride price includes livestock, money, and symbolic items",
                "Traditional dances like Njang and Mangambeu",
            ]),
        CultureEntry::new("bassa", "Bassa", "Bassa")
            .with_steps([
                "Introductory visit (Nkuu)",
                "Bride price discussion",
                "Traditional oath taking",
                "Feast celebration",
            ])
            .with_traditions([
                "Presentation of traditional dishes like Ekwang and Mbongo Tchobi",
                "Use of traditional Bassa attire with specific beadwork",
                "Musical performances with mvet and drums",
            ]),
        CultureEntry::new("bakweri", "Bakweri", "Mokpwe")
            .with_steps([
                "Family introduction (Lelè)",
                "Bride price payment",
                "Traditional rites (Nganja)",
                "Community celebration",
            ])
            .with_traditions([
                "Mount Fako cultural elements incorporated",
                "Traditional palm wine ceremony",
                "Leopard society blessings",
            ]),
        CultureEntry::new("fulani", "Fulani", "Fulfulde")
            .with_steps([
                "Sharo (flogging ritual)",
                "Dowry negotiation",
                "Islamic ceremonies",
                "Traditional Fulani celebrations",
            ])
            .with_traditions([
                "Sharo test of bravery for groom",
                "Dowry in cattle",
                "Henna ceremonies for bride",
                "Traditional Fulani music and dance",
            ]),
    ]
}
