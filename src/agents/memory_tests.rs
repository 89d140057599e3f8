#[cfg(test)]
mod memory_tests {
    use crate::agents::ConversationMemory;
    use crate::llm::{ChatTurn, Role};

    #[test]
    fn test_memory_records_pairs_in_order() {
        let memory = ConversationMemory::new(10);
        memory.record("price of AAPL?", "About $150.");

        assert_eq!(
            memory.history(),
            vec![ChatTurn::user("price of AAPL?"), ChatTurn::assistant("About $150.")]
        );
    }

    #[test]
    fn test_memory_evicts_oldest() {
        let memory = ConversationMemory::new(4);
        memory.record("q1", "a1");
        memory.record("q2", "a2");
        memory.record("q3", "a3");

        let history = memory.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "q2");
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[3].content, "a3");
    }

    #[test]
    fn test_memory_clear() {
        let memory = ConversationMemory::new(4);
        memory.record("q", "a");
        assert!(!memory.is_empty());

        memory.clear();
        assert!(memory.is_empty());
    }
}
